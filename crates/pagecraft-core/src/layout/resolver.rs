//! Resolve a layout and a page's elements into a render plan.
//!
//! This is the only place that branches on the layout variant. Hit testing,
//! the transform controller and renderers consume the [`RenderPlan`].

use super::matching::{MatchOptions, assign};
use super::{CellKind, GridLayout, Layout};
use crate::elements::{Element, ElementId, Geometry};
use kurbo::Point;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ResolveOptions {
    pub matching: MatchOptions,
}

/// Where a placement comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Freeform page, no cell.
    Free,
    /// Grid cell index.
    Cell(usize),
}

/// What a placement draws.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementContent {
    Element(Element),
    /// Empty image cell.
    ImagePlaceholder,
    /// Empty text cell, with its placeholder text.
    TextPlaceholder(String),
}

/// One drawable item of a resolved page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub slot: Slot,
    pub geometry: Geometry,
    pub z_index: i32,
    pub content: PlacementContent,
    /// Whether drag, resize and rotate apply to this placement.
    pub transformable: bool,
}

impl Placement {
    pub fn element(&self) -> Option<&Element> {
        match &self.content {
            PlacementContent::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_id(&self) -> Option<ElementId> {
        self.element().map(|e| e.id)
    }

    pub fn is_placeholder(&self) -> bool {
        self.element().is_none()
    }

    pub fn cell_index(&self) -> Option<usize> {
        match self.slot {
            Slot::Cell(index) => Some(index),
            Slot::Free => None,
        }
    }

    /// Whether a percentage-space point lies inside the unrotated box.
    pub fn contains_unrotated(&self, point: Point) -> bool {
        let g = &self.geometry;
        point.x >= g.x && point.x <= g.x + g.width && point.y >= g.y && point.y <= g.y + g.height
    }
}

/// An element that no grid cell claimed. It is kept on the page but not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmatchedElement {
    pub id: ElementId,
    /// Position in the page's element list.
    pub index: usize,
}

/// Layout-independent list of placements, in paint order (back to front).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderPlan {
    pub placements: Vec<Placement>,
    pub unplaced: Vec<UnmatchedElement>,
}

impl RenderPlan {
    /// Placements front to back, for hit testing.
    pub fn front_to_back(&self) -> impl Iterator<Item = &Placement> {
        self.placements.iter().rev()
    }

    pub fn placement(&self, id: ElementId) -> Option<&Placement> {
        self.placements.iter().find(|p| p.element_id() == Some(id))
    }

    pub fn placement_for_cell(&self, cell: usize) -> Option<&Placement> {
        self.placements.iter().find(|p| p.slot == Slot::Cell(cell))
    }

    /// Ids of all displayed elements, in paint order.
    pub fn element_ids(&self) -> Vec<ElementId> {
        self.placements.iter().filter_map(|p| p.element_id()).collect()
    }

    /// Replace the geometry of the given elements (live gesture preview).
    pub fn apply_preview(&mut self, preview: &[(ElementId, Geometry)]) {
        for placement in &mut self.placements {
            let Some(id) = placement.element_id() else {
                continue;
            };
            if let Some((_, geometry)) = preview.iter().find(|(pid, _)| *pid == id) {
                placement.geometry = *geometry;
                if let PlacementContent::Element(element) = &mut placement.content {
                    element.geometry = *geometry;
                }
            }
        }
    }
}

/// Resolve `elements` under `layout` into a render plan.
pub fn resolve(layout: &Layout, elements: &[Element], options: &ResolveOptions) -> RenderPlan {
    match layout {
        Layout::Freeform => resolve_freeform(elements),
        Layout::Grid(grid) => resolve_grid(grid, elements, options),
    }
}

fn resolve_freeform(elements: &[Element]) -> RenderPlan {
    let mut placements: Vec<Placement> = elements
        .iter()
        .map(|element| Placement {
            slot: Slot::Free,
            geometry: element.geometry,
            z_index: element.z_index,
            content: PlacementContent::Element(element.clone()),
            transformable: !element.locked,
        })
        .collect();
    // Stable sort keeps insertion order for equal z-index
    placements.sort_by_key(|p| p.z_index);

    RenderPlan {
        placements,
        unplaced: Vec::new(),
    }
}

fn resolve_grid(grid: &GridLayout, elements: &[Element], options: &ResolveOptions) -> RenderPlan {
    let assignment = assign(&grid.cells, elements, &options.matching);

    let mut placeholders = Vec::new();
    let mut matched = Vec::new();
    for (ci, (cell, slot)) in grid.cells.iter().zip(&assignment.cells).enumerate() {
        match slot.element_index() {
            Some(ei) => {
                // The cell decides where its occupant sits
                let mut element = elements[ei].clone();
                element.geometry = cell.geometry();
                matched.push(Placement {
                    slot: Slot::Cell(ci),
                    geometry: element.geometry,
                    z_index: element.z_index,
                    content: PlacementContent::Element(element),
                    transformable: false,
                });
            }
            None => {
                let content = match cell.kind {
                    CellKind::Image => PlacementContent::ImagePlaceholder,
                    CellKind::Text => PlacementContent::TextPlaceholder(cell.placeholder().to_string()),
                };
                placeholders.push(Placement {
                    slot: Slot::Cell(ci),
                    geometry: cell.geometry(),
                    z_index: i32::MIN,
                    content,
                    transformable: false,
                });
            }
        }
    }
    matched.sort_by_key(|p| p.z_index);

    let unplaced: Vec<UnmatchedElement> = assignment
        .unplaced
        .iter()
        .map(|&index| UnmatchedElement {
            id: elements[index].id,
            index,
        })
        .collect();
    for item in &unplaced {
        log::debug!(
            "Element {} matches no cell of layout {}; not displayed",
            item.id,
            grid.id
        );
    }

    placeholders.extend(matched);
    RenderPlan {
        placements: placeholders,
        unplaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ImageSource, ShapeVariant};
    use crate::layout::{Cell, LayoutCatalog};

    #[test]
    fn test_freeform_passthrough_sorted() {
        let a = Element::shape(Geometry::default(), ShapeVariant::Rectangle).with_z_index(2);
        let b = Element::shape(Geometry::default(), ShapeVariant::Circle).with_z_index(1);
        let c = Element::text(Geometry::default(), "c").with_z_index(2).locked();
        let elements = vec![a.clone(), b.clone(), c.clone()];

        let plan = resolve(&Layout::Freeform, &elements, &ResolveOptions::default());
        assert_eq!(plan.element_ids(), vec![b.id, a.id, c.id]);
        assert!(plan.unplaced.is_empty());
        assert!(plan.placement(a.id).unwrap().transformable);
        assert!(!plan.placement(c.id).unwrap().transformable);
    }

    #[test]
    fn test_grid_placeholders_for_empty_cells() {
        let grid = LayoutCatalog::builtin().get("hero-top").unwrap().clone();
        let plan = resolve(&Layout::Grid(grid), &[], &ResolveOptions::default());

        assert_eq!(plan.placements.len(), 2);
        assert_eq!(plan.placements[0].content, PlacementContent::ImagePlaceholder);
        assert_eq!(
            plan.placements[1].content,
            PlacementContent::TextPlaceholder("Add a caption".to_string())
        );
    }

    #[test]
    fn test_grid_matched_elements_take_cell_geometry() {
        let grid = GridLayout::new(
            "g",
            "g",
            vec![
                Cell::image(5.0, 5.0, 40.0, 40.0),
                Cell::image(55.0, 5.0, 40.0, 40.0),
            ],
        );
        let photo = Element::image(Geometry::new(55.5, 5.5, 30.0, 30.0), ImageSource::asset("a"));
        let stray = Element::image(Geometry::new(70.0, 80.0, 10.0, 10.0), ImageSource::asset("b"));
        let elements = vec![photo.clone(), stray.clone()];

        let options = ResolveOptions {
            matching: MatchOptions {
                index_fallback: false,
                ..MatchOptions::default()
            },
        };
        let plan = resolve(&Layout::Grid(grid), &elements, &options);

        // Placeholder for cell 0 first, then the matched photo
        assert!(plan.placements[0].is_placeholder());
        assert_eq!(plan.placements[0].slot, Slot::Cell(0));
        let placed = plan.placement(photo.id).unwrap();
        assert_eq!(placed.slot, Slot::Cell(1));
        assert_eq!(placed.geometry, Geometry::new(55.0, 5.0, 40.0, 40.0));
        assert_eq!(placed.element().unwrap().geometry, placed.geometry);
        assert_eq!(
            plan.unplaced,
            vec![UnmatchedElement {
                id: stray.id,
                index: 1
            }]
        );
    }

    #[test]
    fn test_index_fallback_placed_in_its_cell() {
        let cell = Cell::image(5.0, 5.0, 40.0, 40.0);
        let grid = GridLayout::new("g", "g", vec![cell.clone()]);
        let drifted = Element::image(Geometry::new(60.0, 70.0, 10.0, 10.0), ImageSource::asset("a"));

        let plan = resolve(
            &Layout::Grid(grid),
            std::slice::from_ref(&drifted),
            &ResolveOptions::default(),
        );
        let placed = plan.placement_for_cell(0).unwrap();
        assert_eq!(placed.element_id(), Some(drifted.id));
        assert_eq!(placed.geometry, cell.geometry());
        assert!(placed.contains_unrotated(kurbo::Point::new(20.0, 20.0)));
        assert!(!placed.contains_unrotated(kurbo::Point::new(65.0, 75.0)));
    }

    #[test]
    fn test_apply_preview() {
        let element = Element::shape(Geometry::default(), ShapeVariant::Rectangle);
        let mut plan = resolve(
            &Layout::Freeform,
            std::slice::from_ref(&element),
            &ResolveOptions::default(),
        );
        let moved = Geometry::new(50.0, 50.0, 10.0, 10.0);
        plan.apply_preview(&[(element.id, moved)]);
        assert_eq!(plan.placements[0].geometry, moved);
        assert_eq!(plan.placements[0].element().unwrap().geometry, moved);
    }
}

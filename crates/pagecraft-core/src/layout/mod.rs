//! Page layouts: predefined grids of cells, or freeform placement.

mod matching;
pub mod resolver;

pub use matching::{Assignment, CellMatch, MatchOptions, assign, in_cell};
pub use resolver::{
    Placement, PlacementContent, RenderPlan, ResolveOptions, Slot, UnmatchedElement, resolve,
};

use crate::elements::{Element, ElementKind, Geometry, TextStyle};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Default positional matching tolerance, in percentage points.
pub const MATCH_TOLERANCE: f64 = 2.0;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("malformed layout configuration: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for LayoutError {
    fn from(err: serde_json::Error) -> Self {
        LayoutError::Malformed(err.to_string())
    }
}

/// What a grid cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Image,
    Text,
}

/// Payload being dropped onto a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPayload {
    Image,
    Text,
}

/// Defaults for a cell before content is entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellStyle {
    /// Placeholder shown while the cell is empty.
    pub placeholder: Option<String>,
    /// Style applied when text is first entered into the cell.
    pub text_style: Option<TextStyle>,
}

/// One slot of a grid layout, in percentage-space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub kind: CellKind,
    #[serde(default)]
    pub default_style: CellStyle,
}

impl Cell {
    pub fn image(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            kind: CellKind::Image,
            default_style: CellStyle::default(),
        }
    }

    pub fn text(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            kind: CellKind::Text,
            ..Self::image(x, y, w, h)
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.default_style.placeholder = Some(placeholder.into());
        self
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.x, self.y, self.w, self.h)
    }

    /// Whether a drop of `payload` is allowed. Text cells never take images.
    pub fn accepts(&self, payload: DropPayload) -> bool {
        matches!(
            (self.kind, payload),
            (CellKind::Image, DropPayload::Image) | (CellKind::Text, DropPayload::Text)
        )
    }

    /// Whether an element's kind suits this cell.
    pub fn accepts_element(&self, element: &Element) -> bool {
        matches!(
            (self.kind, &element.kind),
            (CellKind::Image, ElementKind::Image(_)) | (CellKind::Text, ElementKind::Text(_))
        )
    }

    /// Placeholder text for an empty cell.
    pub fn placeholder(&self) -> &str {
        match (&self.default_style.placeholder, self.kind) {
            (Some(text), _) => text,
            (None, CellKind::Text) => "Click to add text",
            (None, CellKind::Image) => "Drop an image",
        }
    }

    fn validate(&self, index: usize) -> Result<(), LayoutError> {
        let values = [self.x, self.y, self.w, self.h];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(LayoutError::Malformed(format!(
                "cell {index} has a non-finite coordinate"
            )));
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(LayoutError::Malformed(format!(
                "cell {index} has a non-positive size"
            )));
        }
        Ok(())
    }
}

/// A predefined arrangement of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub cells: Vec<Cell>,
}

impl GridLayout {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cells,
        }
    }

    /// Parse a grid layout from JSON.
    pub fn parse(json: &str) -> Result<Self, LayoutError> {
        let layout: GridLayout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    fn from_value(value: Value) -> Result<Self, LayoutError> {
        let layout: GridLayout = serde_json::from_value(value)?;
        layout.validate()?;
        Ok(layout)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        self.cells
            .iter()
            .enumerate()
            .try_for_each(|(index, cell)| cell.validate(index))
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }
}

/// How elements are arranged on a page.
///
/// A grid that fails to load degrades to freeform placement, so a bad cell
/// never takes the rest of the page down with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Layout {
    Grid(GridLayout),
    /// Elements keep their own geometry.
    #[default]
    Freeform,
}

impl Layout {
    /// Parse a grid configuration, falling back to freeform on error.
    pub fn grid_or_fallback(id: &str, json: &str) -> Layout {
        match GridLayout::parse(json) {
            Ok(grid) => Layout::Grid(grid),
            Err(err) => Layout::fallback(id, &err),
        }
    }

    fn fallback(id: &str, err: &LayoutError) -> Layout {
        log::warn!("Layout {id} is malformed, placing elements freely: {err}");
        Layout::Freeform
    }

    pub fn is_freeform(&self) -> bool {
        matches!(self, Layout::Freeform)
    }

    pub fn as_grid(&self) -> Option<&GridLayout> {
        match self {
            Layout::Grid(grid) => Some(grid),
            Layout::Freeform => None,
        }
    }
}

impl<'de> Deserialize<'de> for Layout {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();
        let layout = match value.get("mode").and_then(Value::as_str) {
            Some("freeform") => Layout::Freeform,
            Some("grid") => match GridLayout::from_value(value) {
                Ok(grid) => Layout::Grid(grid),
                Err(err) => Layout::fallback(&id, &err),
            },
            other => Layout::fallback(
                &id,
                &LayoutError::Malformed(format!("unknown layout mode {other:?}")),
            ),
        };
        Ok(layout)
    }
}

/// Predefined grid layouts addressable by id.
#[derive(Debug, Clone)]
pub struct LayoutCatalog {
    layouts: Vec<GridLayout>,
}

impl Default for LayoutCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LayoutCatalog {
    /// The built-in layouts.
    pub fn builtin() -> Self {
        const M: f64 = 5.0;
        let half = (100.0 - 3.0 * M) / 2.0;
        let third = (100.0 - 4.0 * M) / 3.0;

        let layouts = vec![
            GridLayout::new("single", "Single photo", vec![Cell::image(M, M, 90.0, 90.0)]),
            GridLayout::new(
                "two-column",
                "Two columns",
                vec![
                    Cell::image(M, M, half, 90.0),
                    Cell::image(2.0 * M + half, M, half, 90.0),
                ],
            ),
            GridLayout::new(
                "two-row",
                "Two rows",
                vec![
                    Cell::image(M, M, 90.0, half),
                    Cell::image(M, 2.0 * M + half, 90.0, half),
                ],
            ),
            GridLayout::new(
                "three-column",
                "Three columns",
                (0..3)
                    .map(|i| Cell::image(M + i as f64 * (third + M), M, third, 90.0))
                    .collect(),
            ),
            GridLayout::new(
                "grid-2x2",
                "Grid 2x2",
                (0..4)
                    .map(|i| {
                        let col = (i % 2) as f64;
                        let row = (i / 2) as f64;
                        Cell::image(M + col * (half + M), M + row * (half + M), half, half)
                    })
                    .collect(),
            ),
            GridLayout::new(
                "hero-top",
                "Hero with caption",
                vec![
                    Cell::image(M, M, 90.0, 60.0),
                    Cell::text(M, 70.0, 90.0, 25.0).with_placeholder("Add a caption"),
                ],
            ),
            GridLayout::new(
                "cover",
                "Cover",
                vec![
                    Cell::image(0.0, 0.0, 100.0, 100.0),
                    Cell::text(10.0, 10.0, 80.0, 15.0).with_placeholder("Add a title"),
                ],
            ),
        ];
        Self { layouts }
    }

    /// Load a catalog from a JSON array of grid layouts.
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let layouts: Vec<GridLayout> = serde_json::from_str(json)?;
        for layout in &layouts {
            layout.validate()?;
        }
        Ok(Self { layouts })
    }

    pub fn get(&self, id: &str) -> Option<&GridLayout> {
        self.layouts.iter().find(|layout| layout.id == id)
    }

    pub fn list(&self) -> &[GridLayout] {
        &self.layouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ImageSource;

    #[test]
    fn test_builtin_catalog() {
        let catalog = LayoutCatalog::builtin();
        for id in [
            "single",
            "two-column",
            "two-row",
            "three-column",
            "grid-2x2",
            "hero-top",
            "cover",
        ] {
            let layout = catalog.get(id).unwrap();
            assert!(!layout.cells.is_empty());
            for cell in &layout.cells {
                assert!(cell.x >= 0.0 && cell.x + cell.w <= 100.0 + 1e-9);
                assert!(cell.y >= 0.0 && cell.y + cell.h <= 100.0 + 1e-9);
            }
        }
        assert_eq!(catalog.get("grid-2x2").unwrap().cells.len(), 4);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_parse_grid() {
        let json = r#"{"id":"g","name":"G","cells":[
            {"x":0,"y":0,"w":50,"h":50,"kind":"image"},
            {"x":50,"y":0,"w":50,"h":50,"kind":"text","defaultStyle":{"placeholder":"Title"}}
        ]}"#;
        let grid = GridLayout::parse(json).unwrap();
        assert_eq!(grid.cells.len(), 2);
        assert_eq!(grid.cells[1].placeholder(), "Title");
        assert_eq!(grid.cells[0].placeholder(), "Drop an image");
    }

    #[test]
    fn test_malformed_grid_falls_back_to_freeform() {
        assert!(matches!(
            GridLayout::parse("{not json"),
            Err(LayoutError::Malformed(_))
        ));
        let bad_size = r#"{"id":"g","cells":[{"x":0,"y":0,"w":0,"h":50,"kind":"image"}]}"#;
        assert!(GridLayout::parse(bad_size).is_err());

        assert!(Layout::grid_or_fallback("broken", "[1, 2").is_freeform());
        assert!(Layout::grid_or_fallback("broken", bad_size).is_freeform());
    }

    #[test]
    fn test_malformed_grid_deserializes_as_freeform() {
        let missing_size = r#"{"mode":"grid","id":"g","cells":[{"x":0,"y":0,"kind":"image"}]}"#;
        let layout: Layout = serde_json::from_str(missing_size).unwrap();
        assert!(layout.is_freeform());

        let zero_size = r#"{"mode":"grid","id":"g","cells":[{"x":0,"y":0,"w":0,"h":5,"kind":"text"}]}"#;
        let layout: Layout = serde_json::from_str(zero_size).unwrap();
        assert!(layout.is_freeform());

        let unknown: Layout = serde_json::from_str(r#"{"mode":"spiral"}"#).unwrap();
        assert!(unknown.is_freeform());
    }

    #[test]
    fn test_cell_accepts() {
        let text_cell = Cell::text(0.0, 0.0, 10.0, 10.0);
        let image_cell = Cell::image(0.0, 0.0, 10.0, 10.0);
        assert!(!text_cell.accepts(DropPayload::Image));
        assert!(text_cell.accepts(DropPayload::Text));
        assert!(image_cell.accepts(DropPayload::Image));

        let photo = Element::image(Geometry::default(), ImageSource::asset("p"));
        assert!(image_cell.accepts_element(&photo));
        assert!(!text_cell.accepts_element(&photo));
    }

    #[test]
    fn test_layout_serde() {
        let layout = Layout::Grid(LayoutCatalog::builtin().get("single").unwrap().clone());
        let json = serde_json::to_string(&layout).unwrap();
        assert!(json.contains("\"mode\":\"grid\""));
        let back: Layout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, layout);

        let free: Layout = serde_json::from_str(r#"{"mode":"freeform"}"#).unwrap();
        assert!(free.is_freeform());
    }
}

//! Selection state, handles and hit testing.

pub mod handles;

pub use handles::{Corner, Edge, Handle, HandleKind, ROTATE_HANDLE_OFFSET, handles_for, hit_test_handles};
pub use hit_test::{cell_at, hit_test, to_local};

use crate::elements::ElementId;
use kurbo::Vec2;

/// Rotate a vector by `degrees` (clockwise on screen, y pointing down).
pub(crate) fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Which elements are selected or hovered.
///
/// Kept apart from element data: the page never stores UI state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// Selected ids in selection order.
    selected: Vec<ElementId>,
    hovered: Option<ElementId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a single element (clears other selections).
    pub fn select(&mut self, id: ElementId) {
        self.selected.clear();
        self.selected.push(id);
    }

    pub fn add(&mut self, id: ElementId) {
        if !self.is_selected(id) {
            self.selected.push(id);
        }
    }

    /// Add the element if absent, remove it if present.
    pub fn toggle(&mut self, id: ElementId) {
        if self.is_selected(id) {
            self.deselect(id);
        } else {
            self.selected.push(id);
        }
    }

    pub fn deselect(&mut self, id: ElementId) {
        self.selected.retain(|&s| s != id);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the selection with `ids`.
    pub fn select_all(&mut self, ids: impl IntoIterator<Item = ElementId>) {
        self.selected.clear();
        for id in ids {
            self.add(id);
        }
    }

    /// Drop ids for which `exists` returns false.
    pub fn prune(&mut self, exists: impl Fn(ElementId) -> bool) {
        self.selected.retain(|&id| exists(id));
        if self.hovered.is_some_and(|id| !exists(id)) {
            self.hovered = None;
        }
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selected.contains(&id)
    }

    pub fn selected(&self) -> &[ElementId] {
        &self.selected
    }

    /// The selected element when exactly one is selected.
    pub fn single(&self) -> Option<ElementId> {
        match self.selected.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn set_hovered(&mut self, id: Option<ElementId>) {
        self.hovered = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_select_and_toggle() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut selection = SelectionState::new();

        selection.select(a);
        assert_eq!(selection.single(), Some(a));

        selection.toggle(b);
        assert_eq!(selection.selected(), &[a, b]);
        assert_eq!(selection.single(), None);

        selection.toggle(a);
        assert_eq!(selection.selected(), &[b]);

        selection.select(a);
        assert_eq!(selection.selected(), &[a]);
    }

    #[test]
    fn test_prune() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut selection = SelectionState::new();
        selection.select_all([a, b, a]);
        selection.set_hovered(Some(b));
        assert_eq!(selection.len(), 2);

        selection.prune(|id| id == a);
        assert_eq!(selection.selected(), &[a]);
        assert_eq!(selection.hovered(), None);
    }

    #[test]
    fn test_rotate_vec() {
        let v = rotate_vec(Vec2::new(1.0, 0.0), 90.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 1.0).abs() < 1e-12);
    }
}

//! Snapshot-based undo/redo history.

use crate::page::PageSnapshot;
use std::collections::VecDeque;
use thiserror::Error;

/// Default number of undo states to keep.
pub const DEFAULT_HISTORY_DEPTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("nothing to undo")]
    EmptyUndo,
    #[error("nothing to redo")]
    EmptyRedo,
}

/// Bounded undo/redo stacks of page snapshots.
///
/// Callers capture the state *before* a mutation. Undo hands back the state
/// to restore and remembers the current one for redo.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<PageSnapshot>,
    redo_stack: Vec<PageSnapshot>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Push the pre-mutation state (call before making changes).
    pub fn capture(&mut self, snapshot: PageSnapshot) {
        self.undo_stack.push_back(snapshot);

        // Clear redo stack when new changes are made
        self.redo_stack.clear();

        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }

    /// Step back. `current` is kept for redo; the returned state should be restored.
    pub fn undo(&mut self, current: PageSnapshot) -> Result<PageSnapshot, HistoryError> {
        let snapshot = self.undo_stack.pop_back().ok_or(HistoryError::EmptyUndo)?;
        self.redo_stack.push(current);
        Ok(snapshot)
    }

    /// Step forward. `current` is kept for undo; the returned state should be restored.
    pub fn redo(&mut self, current: PageSnapshot) -> Result<PageSnapshot, HistoryError> {
        let snapshot = self.redo_stack.pop().ok_or(HistoryError::EmptyRedo)?;
        self.undo_stack.push_back(current);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        Ok(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Element, Geometry};
    use crate::page::PageDocument;

    fn snapshot_with(count: usize) -> PageSnapshot {
        let mut page = PageDocument::new();
        for i in 0..count {
            page.add_element(Element::text(Geometry::default(), format!("{i}")));
        }
        page.snapshot()
    }

    #[test]
    fn test_undo_redo() {
        let mut history = History::default();
        let s0 = snapshot_with(0);
        let s1 = snapshot_with(1);

        history.capture(s0.clone());
        let restored = history.undo(s1.clone()).unwrap();
        assert_eq!(restored, s0);
        assert!(history.can_redo());

        let again = history.redo(restored).unwrap();
        assert_eq!(again, s1);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks() {
        let mut history = History::default();
        assert_eq!(history.undo(snapshot_with(0)), Err(HistoryError::EmptyUndo));
        assert_eq!(history.redo(snapshot_with(0)), Err(HistoryError::EmptyRedo));
    }

    #[test]
    fn test_capture_clears_redo() {
        let mut history = History::default();
        history.capture(snapshot_with(0));
        history.undo(snapshot_with(1)).unwrap();
        assert_eq!(history.redo_len(), 1);

        history.capture(snapshot_with(2));
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_depth_evicts_oldest() {
        let mut history = History::new(3);
        for i in 0..5 {
            history.capture(snapshot_with(i));
        }
        assert_eq!(history.undo_len(), 3);

        let mut current = snapshot_with(5);
        let mut sizes = Vec::new();
        while let Ok(snapshot) = history.undo(current.clone()) {
            sizes.push(snapshot.elements.len());
            current = snapshot;
        }
        assert_eq!(sizes, vec![4, 3, 2]);
    }
}

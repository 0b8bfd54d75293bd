//! Undo/redo management for editor operations.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `History` - snapshot stacks of whole document states
//!
//! Because content and structure are persistent ropes, a snapshot is three
//! handles and a cursor; nothing is deep-copied.

use crate::ledger::LineLedger;
use crate::rope::Rope;
use crate::types::Cursor;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// One saved document state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub content: Rope,
    pub structure: LineLedger,
    pub cursor: Cursor,
}

/// Undo and redo stacks.
///
/// Unbounded unless a limit is given, in which case the oldest undo entries
/// are dropped first.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    limit: Option<usize>,
}

impl History {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Record the state before a new edit. Clears the redo stack.
    pub fn push(&mut self, snapshot: Snapshot) {
        self.redo_stack.clear();
        self.undo_stack.push(snapshot);
        if let Some(limit) = self.limit {
            let excess = self.undo_stack.len().saturating_sub(limit);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }
        tracing::debug!(depth = self.undo_stack.len(), "snapshot saved");
    }

    /// A new edit happened without a snapshot; redo no longer applies.
    pub fn invalidate_redo(&mut self) {
        self.redo_stack.clear();
    }

    /// Swap `current` for the most recent undo entry.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Swap `current` for the most recent redo entry.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
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

    fn snap(text: &str) -> Snapshot {
        Snapshot {
            content: Rope::from(text),
            structure: LineLedger::new(),
            cursor: Cursor::default(),
        }
    }

    #[test]
    fn test_undo_redo_swap() {
        let mut history = History::new(None);
        history.push(snap("a"));

        let restored = history.undo(snap("ab")).unwrap();
        assert_eq!(restored.content.to_string(), "a");
        assert!(history.can_redo());

        let again = history.redo(restored).unwrap();
        assert_eq!(again.content.to_string(), "ab");
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut history = History::default();
        assert!(history.undo(snap("x")).is_none());
        assert!(history.redo(snap("x")).is_none());
        assert_eq!(history.undo_depth(), 0);
        assert_eq!(history.redo_depth(), 0);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = History::new(None);
        history.push(snap("1"));
        history.undo(snap("2"));
        assert!(history.can_redo());

        history.push(snap("1"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(Some(2));
        for text in ["a", "b", "c"] {
            history.push(snap(text));
        }
        assert_eq!(history.undo_depth(), 2);
        let top = history.undo(snap("d")).unwrap();
        assert_eq!(top.content.to_string(), "c");
        let next = history.undo(top).unwrap();
        assert_eq!(next.content.to_string(), "b");
        assert!(!history.can_undo());
    }
}

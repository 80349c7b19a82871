//! Snapshot-based undo/redo history.
//!
//! The stack only stores snapshots; applying a snapshot returned by
//! [`UndoRedoStack::undo`] or [`UndoRedoStack::redo`] is the caller's job.
//! This keeps the history independent of the vertex store and testable on
//! its own.

use crate::error::HistoryError;

/// Default maximum number of undo entries.
pub const DEFAULT_UNDO_DEPTH: usize = 100;

/// Two stacks of snapshots with a bounded undo depth.
#[derive(Debug, Clone)]
pub struct UndoRedoStack<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    max_depth: usize,
}

impl<T> UndoRedoStack<T> {
    /// Create a new stack with the default depth (100)
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_UNDO_DEPTH)
    }

    /// Create with custom maximum undo depth (at least 1)
    pub fn with_depth(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the pre-mutation state. Clears the redo stack.
    pub fn record(&mut self, snapshot: T) {
        self.redo_stack.clear();
        self.undo_stack.push(snapshot);

        // Trim if exceeds max depth
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the last recorded state; `current` moves onto the redo stack.
    pub fn undo(&mut self, current: T) -> Result<T, HistoryError> {
        let previous = self.undo_stack.pop().ok_or(HistoryError::NothingToUndo)?;
        self.redo_stack.push(current);
        Ok(previous)
    }

    /// Pop the last undone state; `current` moves back onto the undo stack.
    pub fn redo(&mut self, current: T) -> Result<T, HistoryError> {
        let next = self.redo_stack.pop().ok_or(HistoryError::NothingToRedo)?;
        self.undo_stack.push(current);
        Ok(next)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo entries
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo entries
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Maximum number of undo entries kept
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<T> Default for UndoRedoStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

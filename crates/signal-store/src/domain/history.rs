//! # Command History
//!
//! Two-stack undo/redo ledger of state snapshots.
//!
//! ```text
//!   add(prev, "inc")            undo(current)              redo(current)
//!  ┌──────────┐               ┌──────────┐ ──pop──►      ┌──────────┐
//!  │ undo     │ ◄── push      │ undo     │   restore     │ redo     │ ──pop──► restore
//!  │ stack    │               │ stack    │               │ stack    │
//!  └──────────┘               └──────────┘               └──────────┘
//!  redo stack cleared         current pushed to redo     current pushed to undo
//! ```
//!
//! Snapshots are `Arc<S>`: a stored state can never be mutated through the
//! history, so undo always returns exactly the value that was replaced.

use std::collections::VecDeque;
use std::sync::Arc;

/// Label used when a state change does not name its command.
pub const UNSPECIFIED_COMMAND: &str = "unspecified command";

/// A snapshot and the command that replaced it.
#[derive(Debug)]
pub struct HistoryEntry<S> {
    pub state: Arc<S>,
    pub command: String,
}

impl<S> Clone for HistoryEntry<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            command: self.command.clone(),
        }
    }
}

/// Linear undo/redo history for one store.
#[derive(Debug)]
pub struct History<S> {
    /// Oldest entry at the front.
    undo: VecDeque<HistoryEntry<S>>,
    /// Most recently undone entry at the back.
    redo: Vec<HistoryEntry<S>>,
    limit: Option<usize>,
}

impl<S> History<S> {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::with_limit(None)
    }

    /// History keeping at most `limit` undo entries (`None` = unbounded).
    /// A limit of zero records nothing.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Record the state that a new command is about to replace.
    ///
    /// Invalidates the redo branch.
    pub fn add(&mut self, before: Arc<S>, command: impl Into<String>) {
        self.redo.clear();
        self.undo.push_back(HistoryEntry {
            state: before,
            command: command.into(),
        });
        self.enforce_limit();
    }

    /// Step back one command.
    ///
    /// Returns the entry to restore, or `None` if there is nothing to undo.
    /// `current` is kept on the redo stack under the undone command's label.
    pub fn undo(&mut self, current: Arc<S>) -> Option<HistoryEntry<S>> {
        let entry = self.undo.pop_back()?;
        self.redo.push(HistoryEntry {
            state: current,
            command: entry.command.clone(),
        });
        Some(entry)
    }

    /// Re-apply the most recently undone command.
    ///
    /// Returns the entry to restore, or `None` if there is nothing to redo.
    pub fn redo(&mut self, current: Arc<S>) -> Option<HistoryEntry<S>> {
        let entry = self.redo.pop()?;
        self.undo.push_back(HistoryEntry {
            state: current,
            command: entry.command.clone(),
        });
        self.enforce_limit();
        Some(entry)
    }

    /// Undo stack, oldest first.
    pub fn entries(&self) -> Vec<HistoryEntry<S>> {
        self.undo.iter().cloned().collect()
    }

    /// Redo stack, next entry to redo last.
    pub fn redo_entries(&self) -> Vec<HistoryEntry<S>> {
        self.redo.clone()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undoable commands.
    pub fn len(&self) -> usize {
        self.undo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.undo.is_empty() && self.redo.is_empty()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    fn enforce_limit(&mut self) {
        if let Some(limit) = self.limit {
            while self.undo.len() > limit {
                self.undo.pop_front();
            }
        }
    }
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new()
    }
}

use serde::{Deserialize, Serialize};

use crate::geometry::Vertex;

/// One recorded vertex mutation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// `vertex` was inserted at `index`.
    Add { vertex: Vertex, index: usize },
    /// The vertex at `index` was relocated from `from` to `to`.
    Move { index: usize, from: Vertex, to: Vertex },
    /// `vertex` was removed from `index`.
    Remove { vertex: Vertex, index: usize },
}

impl Action {
    /// The action that undoes this one.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Self::Add { vertex, index } => Self::Remove { vertex, index },
            Self::Remove { vertex, index } => Self::Add { vertex, index },
            Self::Move { index, from, to } => Self::Move {
                index,
                from: to,
                to: from,
            },
        }
    }
}

/// Linear undo/redo log.
///
/// The history only moves actions between its two stacks; applying them to a
/// vertex list is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Action>,
    redo_stack: Vec<Action>,
}

impl History {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly applied action. Discards any redoable future.
    pub fn record(&mut self, action: Action) {
        self.undo_stack.push(action);
        if !self.redo_stack.is_empty() {
            tracing::trace!(discarded = self.redo_stack.len(), "redo stack cleared");
            self.redo_stack.clear();
        }
    }

    /// Moves the most recent action to the redo stack and returns it.
    pub fn undo(&mut self) -> Option<Action> {
        let action = self.undo_stack.pop()?;
        self.redo_stack.push(action);
        Some(action)
    }

    /// Moves the most recently undone action back to the undo stack and returns it.
    pub fn redo(&mut self) -> Option<Action> {
        let action = self.redo_stack.pop()?;
        self.undo_stack.push(action);
        Some(action)
    }

    /// Reverts the bookkeeping of a [`History::undo`] whose action could not be applied.
    pub(crate) fn unwind_undo(&mut self) {
        if let Some(action) = self.redo_stack.pop() {
            self.undo_stack.push(action);
        }
    }

    /// Reverts the bookkeeping of a [`History::redo`] whose action could not be applied.
    pub(crate) fn unwind_redo(&mut self) {
        if let Some(action) = self.undo_stack.pop() {
            self.redo_stack.push(action);
        }
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of actions that can be undone.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of actions that can be redone.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Applied actions, oldest first.
    #[must_use]
    pub fn applied(&self) -> &[Action] {
        &self.undo_stack
    }

    /// Drops both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

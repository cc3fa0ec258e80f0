//! Bounded snapshot-based undo/redo over the whole graph state.

use crate::graph::GraphState;

/// Maximum depth of each stack; the oldest snapshot is evicted beyond it.
pub const MAX_HISTORY: usize = 5;

#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<GraphState>,
    redo_stack: Vec<GraphState>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `current` as an undo checkpoint. Any forward history is
    /// invalidated by a new action.
    pub fn snapshot(&mut self, current: &GraphState) {
        push_bounded(&mut self.undo_stack, current.clone());
        self.redo_stack.clear();
    }

    /// Step back, handing out the state to restore. `current` becomes a
    /// redo checkpoint. Returns `None` on an empty stack.
    pub fn undo(&mut self, current: &GraphState) -> Option<GraphState> {
        let previous = self.undo_stack.pop()?;
        push_bounded(&mut self.redo_stack, current.clone());
        Some(previous)
    }

    pub fn redo(&mut self, current: &GraphState) -> Option<GraphState> {
        let next = self.redo_stack.pop()?;
        push_bounded(&mut self.undo_stack, current.clone());
        Some(next)
    }

    /// Drop both stacks. Loading a document is not undoable by design.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

fn push_bounded(stack: &mut Vec<GraphState>, state: GraphState) {
    stack.push(state);
    if stack.len() > MAX_HISTORY {
        let excess = stack.len() - MAX_HISTORY;
        stack.drain(0..excess);
    }
}

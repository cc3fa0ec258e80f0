//! The graph store: sole owner of canonical state.
//!
//! Every mutating operation snapshots history first (no-ops return before
//! snapshotting so they never burn an undo slot), and every
//! structure-changing operation re-runs the layout before returning.

use std::collections::HashMap;

use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::graph::{GraphState, Level, Point, TaskEdge, TaskNode, demo_graph, descendants};
use crate::history::History;
use crate::layout::calculate_layout;
use crate::persist;
use crate::progress;

/// Result of `add_node`. `unpinned_parent` is set when the parent lost its
/// pin because it stopped being a leaf; callers surface this to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct AddNodeOutcome {
    pub node_id: String,
    pub unpinned_parent: Option<String>,
}

#[derive(Debug)]
struct DragState {
    node_id: String,
    origin: Point,
    /// Positions of the dragged node and its descendants at drag start.
    /// Immutable for the whole drag; every move derives from it.
    initial: HashMap<String, Point>,
    /// In-flight positions. Committed to canonical state only on stop.
    live: HashMap<String, Point>,
}

#[derive(Debug)]
pub struct GraphStore {
    state: GraphState,
    history: History,
    config: EngineConfig,
    drag: Option<DragState>,
    formatting: bool,
}

impl GraphStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: GraphState::default(),
            history: History::new(),
            config,
            drag: None,
            formatting: false,
        }
    }

    /// Store preloaded with the laid-out 7-node demo tree.
    pub fn demo(config: EngineConfig) -> Self {
        let mut store = Self::new(config);
        let mut state = demo_graph();
        state.nodes = calculate_layout(&state.nodes, &state.edges, &store.config);
        store.state = state;
        store
    }

    pub fn nodes(&self) -> &[TaskNode] {
        &self.state.nodes
    }

    pub fn edges(&self) -> &[TaskEdge] {
        &self.state.edges
    }

    pub fn pinned_ids(&self) -> &[String] {
        &self.state.pinned_ids
    }

    pub fn batch_title(&self) -> &str {
        &self.state.batch_title
    }

    pub fn node(&self, id: &str) -> Option<&TaskNode> {
        self.state.node(id)
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a node at the next slot for its level, optionally attached
    /// under `parent`. Returns `None` when `parent` names a missing node,
    /// when `level` is not the parent's child level, or when a parentless
    /// node is not a root; the level progression along every edge stays
    /// strictly root → subtask → todo.
    pub fn add_node(&mut self, parent: Option<&str>, level: Level) -> Option<AddNodeOutcome> {
        match parent {
            Some(parent_id) => {
                let parent_node = self.state.node(parent_id)?;
                if parent_node.level.child() != Some(level) {
                    return None;
                }
            }
            None => {
                if level != Level::Root {
                    return None;
                }
            }
        }
        self.history.snapshot(&self.state);

        let mut unpinned_parent = None;
        if let Some(parent_id) = parent
            && self.state.pinned_ids.iter().any(|id| id == parent_id)
        {
            // A node that gains a child is no longer a leaf and cannot
            // stay on the pin list.
            self.state.pinned_ids.retain(|id| id != parent_id);
            unpinned_parent = Some(parent_id.to_string());
        }

        let node_id = Uuid::new_v4().to_string();
        self.state.nodes.push(TaskNode {
            id: node_id.clone(),
            label: "New Task".to_string(),
            level,
            slot: self.state.count_at_level(level),
            completed: None,
            position: Point::default(),
        });
        if let Some(parent_id) = parent {
            self.state.edges.push(TaskEdge {
                id: Uuid::new_v4().to_string(),
                source: parent_id.to_string(),
                target: node_id.clone(),
            });
        }

        self.relayout();
        Some(AddNodeOutcome {
            node_id,
            unpinned_parent,
        })
    }

    /// Replace a node's label. Deliberately does not re-run the layout even
    /// though label length feeds extent estimation; only structural edits do.
    pub fn update_node_label(&mut self, id: &str, label: &str) {
        if self.state.node(id).is_none() {
            return;
        }
        self.history.snapshot(&self.state);
        if let Some(node) = self.state.node_mut(id) {
            node.label = label.to_string();
        }
    }

    /// Flip completion. Tolerated (though meaningless) on non-leaves.
    pub fn toggle_node_completed(&mut self, id: &str) {
        if self.state.node(id).is_none() {
            return;
        }
        self.history.snapshot(&self.state);
        if let Some(node) = self.state.node_mut(id) {
            node.completed = Some(!node.is_completed());
        }
    }

    /// Delete a node and its whole descendant subtree atomically, pruning
    /// every touching edge and any pin entries for removed ids.
    pub fn delete_node(&mut self, id: &str) {
        if self.state.node(id).is_none() {
            return;
        }
        self.history.snapshot(&self.state);

        let mut removed = descendants(id, &self.state.edges);
        removed.push(id.to_string());
        let removed: std::collections::HashSet<&str> =
            removed.iter().map(String::as_str).collect();

        self.state.nodes.retain(|node| !removed.contains(node.id.as_str()));
        self.state.edges.retain(|edge| {
            !removed.contains(edge.source.as_str()) && !removed.contains(edge.target.as_str())
        });
        self.state.pinned_ids.retain(|pin| !removed.contains(pin.as_str()));

        self.relayout();
    }

    /// Exchange slots with whichever node currently holds `(level,
    /// target_slot)`; first match wins when slots tie. Edges are untouched.
    pub fn swap_slots(&mut self, id: &str, target_slot: usize) {
        let Some(node) = self.state.node(id) else {
            return;
        };
        let level = node.level;
        let current_slot = node.slot;
        if current_slot == target_slot {
            return;
        }
        self.history.snapshot(&self.state);

        let other = self
            .state
            .nodes
            .iter()
            .position(|n| n.level == level && n.slot == target_slot && n.id != id);
        if let Some(index) = other {
            self.state.nodes[index].slot = current_slot;
        }
        if let Some(node) = self.state.node_mut(id) {
            node.slot = target_slot;
        }

        self.relayout();
    }

    /// Re-derive every slot from current on-screen order along the sibling
    /// axis, then lay out. Sets the advisory formatting flag so a consuming
    /// UI may animate the transition.
    pub fn apply_auto_layout(&mut self) {
        self.history.snapshot(&self.state);

        for level in Level::all() {
            let mut at_level: Vec<usize> = (0..self.state.nodes.len())
                .filter(|&i| self.state.nodes[i].level == level)
                .collect();
            at_level.sort_by(|&a, &b| {
                self.state.nodes[a]
                    .position
                    .x
                    .total_cmp(&self.state.nodes[b].position.x)
            });
            for (slot, index) in at_level.into_iter().enumerate() {
                self.state.nodes[index].slot = slot;
            }
        }

        self.relayout();
        self.formatting = true;
    }

    /// Take the advisory formatting flag, clearing it.
    pub fn take_formatting(&mut self) -> bool {
        std::mem::take(&mut self.formatting)
    }

    /// Pin a leaf. No-op if already pinned, unknown, or not a leaf.
    pub fn pin_node(&mut self, id: &str) {
        if self.state.node(id).is_none()
            || !self.state.is_leaf(id)
            || self.state.pinned_ids.iter().any(|pin| pin == id)
        {
            return;
        }
        self.history.snapshot(&self.state);
        self.state.pinned_ids.push(id.to_string());
    }

    pub fn unpin_node(&mut self, id: &str) {
        if !self.state.pinned_ids.iter().any(|pin| pin == id) {
            return;
        }
        self.history.snapshot(&self.state);
        self.state.pinned_ids.retain(|pin| pin != id);
    }

    pub fn unpin_all(&mut self) {
        if self.state.pinned_ids.is_empty() {
            return;
        }
        self.history.snapshot(&self.state);
        self.state.pinned_ids.clear();
    }

    /// Move one id within the pin list.
    pub fn reorder_pinned_nodes(&mut self, from: usize, to: usize) {
        let len = self.state.pinned_ids.len();
        if from >= len || to >= len || from == to {
            return;
        }
        self.history.snapshot(&self.state);
        let id = self.state.pinned_ids.remove(from);
        self.state.pinned_ids.insert(to, id);
    }

    /// Mark all pinned nodes done, unless all are already done, in which
    /// case mark all undone.
    pub fn toggle_all_pinned_completed(&mut self) {
        let pinned: Vec<String> = self.state.pinned_ids.clone();
        if pinned.is_empty() {
            return;
        }
        let all_done = pinned
            .iter()
            .all(|id| self.state.node(id).is_some_and(TaskNode::is_completed));
        self.history.snapshot(&self.state);
        for id in &pinned {
            if let Some(node) = self.state.node_mut(id) {
                node.completed = Some(!all_done);
            }
        }
    }

    pub fn set_batch_title(&mut self, title: &str) {
        self.history.snapshot(&self.state);
        self.state.batch_title = title.to_string();
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.state) {
            Some(previous) => {
                self.state = previous;
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.state) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Completed-leaf ratio for a node, in `[0, 1]`.
    pub fn progress(&self, id: &str) -> f32 {
        progress::progress(id, &self.state.nodes, &self.state.edges)
    }

    pub fn serialize(&self) -> Result<String, EngineError> {
        persist::serialize(&self.state, &self.config)
    }

    /// Replace the whole state from a persisted document. Clears both
    /// history stacks; a load is not undoable. Persisted positions are
    /// kept as-is. On parse failure the prior state is untouched.
    pub fn deserialize(&mut self, text: &str) -> Result<(), EngineError> {
        let state = persist::deserialize(text)?;
        self.replace_state(state);
        Ok(())
    }

    /// Replace the whole state from a reduced producer document, then lay
    /// it out (reduced documents carry no positions).
    pub fn load_reduced(&mut self, text: &str) -> Result<(), EngineError> {
        let mut state = crate::import::import_reduced(text)?;
        state.nodes = calculate_layout(&state.nodes, &state.edges, &self.config);
        self.replace_state(state);
        Ok(())
    }

    /// Begin dragging a node: capture initial positions of the node and
    /// its whole subtree. One drag is one undoable action. Returns false
    /// for an unknown id.
    pub fn drag_start(&mut self, id: &str) -> bool {
        let Some(node) = self.state.node(id) else {
            return false;
        };
        self.history.snapshot(&self.state);

        let mut initial = HashMap::new();
        initial.insert(id.to_string(), node.position);
        for descendant in descendants(id, &self.state.edges) {
            if let Some(child) = self.state.node(&descendant) {
                initial.insert(descendant, child.position);
            }
        }
        self.drag = Some(DragState {
            node_id: id.to_string(),
            origin: node.position,
            live: initial.clone(),
            initial,
        });
        true
    }

    /// Update in-flight positions from the current pointer position. The
    /// delta is taken against the start-time snapshot, never the previous
    /// move, so repeated events cannot accumulate drift. O(subtree size).
    /// Events for anything but the actively dragged node are ignored.
    pub fn drag_move(&mut self, id: &str, position: Point) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if drag.node_id != id {
            return;
        }
        let dx = position.x - drag.origin.x;
        let dy = position.y - drag.origin.y;
        for (id, start) in &drag.initial {
            let live = if *id == drag.node_id {
                position
            } else {
                Point::new(start.x + dx, start.y + dy)
            };
            drag.live.insert(id.clone(), live);
        }
    }

    /// In-flight positions of the dragged subtree, if a drag is active.
    pub fn drag_positions(&self) -> Option<&HashMap<String, Point>> {
        self.drag.as_ref().map(|drag| &drag.live)
    }

    /// Commit the in-flight positions into canonical state in one write.
    pub fn drag_stop(&mut self) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        for node in &mut self.state.nodes {
            if let Some(position) = drag.live.get(&node.id) {
                node.position = *position;
            }
        }
    }

    /// Abandon an in-flight drag; canonical state stays untouched.
    pub fn drag_cancel(&mut self) {
        self.drag = None;
    }

    fn replace_state(&mut self, state: GraphState) {
        self.state = state;
        self.history.clear();
        self.drag = None;
        self.formatting = false;
    }

    fn relayout(&mut self) {
        self.state.nodes = calculate_layout(&self.state.nodes, &self.state.edges, &self.config);
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

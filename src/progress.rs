//! Completion aggregation over leaf descendants.

use crate::graph::{TaskEdge, TaskNode, descendants};

/// All leaf descendants of `id`, in traversal order.
///
/// A node with no children counts as its own single leaf descendant.
pub fn leaf_descendants<'a>(
    id: &str,
    nodes: &'a [TaskNode],
    edges: &[TaskEdge],
) -> Vec<&'a TaskNode> {
    let closure = descendants(id, edges);
    if closure.is_empty() {
        return nodes.iter().filter(|node| node.id == id).collect();
    }
    let has_children = |candidate: &str| edges.iter().any(|edge| edge.source == candidate);
    closure
        .iter()
        .filter(|candidate| !has_children(candidate))
        .filter_map(|candidate| nodes.iter().find(|node| &node.id == candidate))
        .collect()
}

/// Completed-leaf ratio for `id`, in `[0, 1]`.
///
/// Depends only on the set of leaf descendants, never on visitation
/// order. Zero leaves (including an unknown id) yields 0.
pub fn progress(id: &str, nodes: &[TaskNode], edges: &[TaskEdge]) -> f32 {
    let leaves = leaf_descendants(id, nodes, edges);
    if leaves.is_empty() {
        return 0.0;
    }
    let completed = leaves.iter().filter(|leaf| leaf.is_completed()).count();
    completed as f32 / leaves.len() as f32
}

//! Deterministic tree layout.
//!
//! Pure function over the node and edge sets: subtree extents are computed
//! bottom-up (memoized per node id), then positions are assigned top-down
//! with each child centered inside its own extent slice. Running the layout
//! twice on the same logical input yields bit-identical coordinates.

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::graph::{Level, Point, TaskEdge, TaskNode};

/// Estimated sibling-axis extent of a single node, from its label text.
///
/// Only the longest line of a multi-line label counts; the result is
/// clamped to the configured min/max widths.
fn estimate_node_width(node: &TaskNode, config: &EngineConfig) -> f32 {
    let longest_line = node
        .label
        .lines()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let text_width = longest_line as f32 * config.char_width;
    let estimated = text_width + config.label_padding + config.checkbox_width;
    estimated.clamp(config.min_node_width, config.max_node_width)
}

/// Sibling-axis extent of a node's whole subtree, memoized per node id.
fn subtree_width(
    id: &str,
    nodes_by_id: &HashMap<&str, &TaskNode>,
    children: &HashMap<&str, Vec<&TaskNode>>,
    memo: &mut HashMap<String, f32>,
    config: &EngineConfig,
) -> f32 {
    if let Some(width) = memo.get(id) {
        return *width;
    }
    let Some(node) = nodes_by_id.get(id) else {
        return config.min_node_width;
    };
    let own_width = estimate_node_width(node, config);
    // Seeding the memo before descending breaks re-entry if the edge set
    // is malformed enough to contain a cycle.
    memo.insert(id.to_string(), own_width);
    let width = match children.get(id) {
        None => own_width,
        Some(kids) if kids.is_empty() => own_width,
        Some(kids) => {
            let mut total = 0.0;
            for child in kids {
                total += subtree_width(&child.id, nodes_by_id, children, memo, config);
            }
            total += config.node_spacing * (kids.len() as f32 - 1.0);
            own_width.max(total)
        }
    };
    memo.insert(id.to_string(), width);
    width
}

fn position_subtree(
    id: &str,
    center_x: f32,
    y: f32,
    nodes_by_id: &HashMap<&str, &TaskNode>,
    children: &HashMap<&str, Vec<&TaskNode>>,
    memo: &mut HashMap<String, f32>,
    positioned: &mut HashMap<String, Point>,
    config: &EngineConfig,
) {
    if !nodes_by_id.contains_key(id) || positioned.contains_key(id) {
        return;
    }
    positioned.insert(id.to_string(), Point::new(center_x, y));

    let Some(kids) = children.get(id) else {
        return;
    };
    let child_widths: Vec<f32> = kids
        .iter()
        .map(|child| subtree_width(&child.id, nodes_by_id, children, memo, config))
        .collect();
    let total_width: f32 =
        child_widths.iter().sum::<f32>() + config.node_spacing * (kids.len() as f32 - 1.0);

    let mut current_x = center_x - total_width / 2.0;
    for (child, child_width) in kids.iter().zip(&child_widths) {
        position_subtree(
            &child.id,
            current_x + child_width / 2.0,
            y + config.level_spacing,
            nodes_by_id,
            children,
            memo,
            positioned,
            config,
        );
        current_x += child_width + config.node_spacing;
    }
}

/// Compute positions for every node reachable from a root.
///
/// Roots (level 0) are stacked left-to-right in ascending slot order with
/// extra inter-root spacing; nodes unreachable from any root keep their
/// previous positions.
pub fn calculate_layout(
    nodes: &[TaskNode],
    edges: &[TaskEdge],
    config: &EngineConfig,
) -> Vec<TaskNode> {
    let mut roots: Vec<&TaskNode> = nodes
        .iter()
        .filter(|node| node.level == Level::Root)
        .collect();
    if roots.is_empty() {
        return nodes.to_vec();
    }
    roots.sort_by_key(|node| node.slot);

    let nodes_by_id: HashMap<&str, &TaskNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let mut children: HashMap<&str, Vec<&TaskNode>> = HashMap::new();
    for edge in edges {
        if let Some(target) = nodes_by_id.get(edge.target.as_str()) {
            children.entry(edge.source.as_str()).or_default().push(target);
        }
    }
    for kids in children.values_mut() {
        kids.sort_by_key(|node| node.slot);
    }

    let mut memo: HashMap<String, f32> = HashMap::new();
    let root_widths: Vec<f32> = roots
        .iter()
        .map(|root| subtree_width(&root.id, &nodes_by_id, &children, &mut memo, config))
        .collect();
    let total_width: f32 =
        root_widths.iter().sum::<f32>() + config.root_spacing() * (roots.len() as f32 - 1.0);

    let mut positioned: HashMap<String, Point> = HashMap::new();
    let mut current_x = -total_width / 2.0;
    for (root, root_width) in roots.iter().zip(&root_widths) {
        position_subtree(
            &root.id,
            current_x + root_width / 2.0,
            0.0,
            &nodes_by_id,
            &children,
            &mut memo,
            &mut positioned,
            config,
        );
        current_x += root_width + config.root_spacing();
    }

    nodes
        .iter()
        .map(|node| match positioned.get(&node.id) {
            Some(position) => TaskNode {
                position: *position,
                ..node.clone()
            },
            None => node.clone(),
        })
        .collect()
}

/// Nearest existing slot at `level` for a sibling-axis coordinate.
///
/// Used when translating a drop position back into the manual ordering;
/// ties keep the first match in slot order.
pub fn slot_at_position(x: f32, level: Level, nodes: &[TaskNode]) -> usize {
    let mut at_level: Vec<&TaskNode> = nodes.iter().filter(|node| node.level == level).collect();
    at_level.sort_by_key(|node| node.slot);

    let mut closest_slot = 0;
    let mut min_distance = f32::INFINITY;
    for node in at_level {
        let distance = (x - node.position.x).abs();
        if distance < min_distance {
            min_distance = distance;
            closest_slot = node.slot;
        }
    }
    closest_slot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::demo_graph;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn node(id: &str, label: &str, level: Level, slot: usize) -> TaskNode {
        TaskNode {
            id: id.to_string(),
            label: label.to_string(),
            level,
            slot,
            completed: None,
            position: Point::default(),
        }
    }

    fn edge(id: &str, source: &str, target: &str) -> TaskEdge {
        TaskEdge {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    #[test]
    fn empty_node_set_is_returned_unchanged() {
        let out = calculate_layout(&[], &[], &config());
        assert!(out.is_empty());
    }

    #[test]
    fn isolated_leaf_with_empty_label_gets_min_extent() {
        let leaf = node("a", "", Level::Todo, 0);
        assert_eq!(estimate_node_width(&leaf, &config()), 120.0);
    }

    #[test]
    fn long_labels_clamp_to_max_extent() {
        let leaf = node("a", &"x".repeat(200), Level::Todo, 0);
        assert_eq!(estimate_node_width(&leaf, &config()), 300.0);
    }

    #[test]
    fn multiline_label_uses_longest_line_only() {
        let leaf = node("a", "short\nmuch much longer line\nmid", Level::Todo, 0);
        let single = node("b", "much much longer line", Level::Todo, 0);
        assert_eq!(
            estimate_node_width(&leaf, &config()),
            estimate_node_width(&single, &config())
        );
    }

    #[test]
    fn layout_is_deterministic() {
        let state = demo_graph();
        let first = calculate_layout(&state.nodes, &state.edges, &config());
        // Strip positions back to defaults and lay out again.
        let stripped: Vec<TaskNode> = first
            .iter()
            .map(|n| TaskNode {
                position: Point::default(),
                ..n.clone()
            })
            .collect();
        let second = calculate_layout(&stripped, &state.edges, &config());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.position, b.position, "node {}", a.id);
        }
    }

    #[test]
    fn demo_tree_lays_out_to_known_coordinates() {
        // Leaf width: 6 chars * 8 + 32 + 28 = 108, clamped up to 120.
        // Subtask subtree: 120 + 120 + 100 = 340; root subtree: 340 * 2 + 100 = 780.
        let state = demo_graph();
        let out = calculate_layout(&state.nodes, &state.edges, &config());
        let pos = |id: &str| out.iter().find(|n| n.id == id).unwrap().position;
        assert_eq!(pos("root-1"), Point::new(0.0, 0.0));
        assert_eq!(pos("subtask-1"), Point::new(-220.0, 220.0));
        assert_eq!(pos("subtask-2"), Point::new(220.0, 220.0));
        assert_eq!(pos("todo-1-1"), Point::new(-330.0, 440.0));
        assert_eq!(pos("todo-1-2"), Point::new(-110.0, 440.0));
        assert_eq!(pos("todo-2-1"), Point::new(110.0, 440.0));
        assert_eq!(pos("todo-2-2"), Point::new(330.0, 440.0));
    }

    #[test]
    fn parent_is_centered_over_children() {
        let state = demo_graph();
        let out = calculate_layout(&state.nodes, &state.edges, &config());
        let s1 = out.iter().find(|n| n.id == "subtask-1").unwrap();
        let t1 = out.iter().find(|n| n.id == "todo-1-1").unwrap();
        let t2 = out.iter().find(|n| n.id == "todo-1-2").unwrap();
        let mid = (t1.position.x + t2.position.x) / 2.0;
        assert!((s1.position.x - mid).abs() < 1e-3);
    }

    #[test]
    fn multiple_roots_get_extra_spacing() {
        let nodes = vec![
            node("r1", "Root A", Level::Root, 0),
            node("r2", "Root B", Level::Root, 1),
        ];
        let out = calculate_layout(&nodes, &[], &config());
        let r1 = &out[0];
        let r2 = &out[1];
        let cfg = config();
        let gap = r2.position.x - r1.position.x;
        // Two min-width roots centered around zero, two node-spacings apart.
        assert_eq!(gap, cfg.min_node_width + cfg.root_spacing());
        assert!((r1.position.x + r2.position.x).abs() < 1e-3);
    }

    #[test]
    fn unreachable_nodes_keep_previous_positions() {
        let mut orphan = node("orphan", "Stray", Level::Todo, 9);
        orphan.position = Point::new(42.0, 77.0);
        let nodes = vec![node("r1", "Root", Level::Root, 0), orphan];
        let out = calculate_layout(&nodes, &[], &config());
        let stray = out.iter().find(|n| n.id == "orphan").unwrap();
        assert_eq!(stray.position, Point::new(42.0, 77.0));
    }

    #[test]
    fn cyclic_edges_terminate() {
        let nodes = vec![
            node("r", "Root", Level::Root, 0),
            node("a", "A", Level::Subtask, 0),
        ];
        let edges = vec![edge("e1", "r", "a"), edge("e2", "a", "r")];
        let out = calculate_layout(&nodes, &edges, &config());
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn slot_at_position_picks_nearest_node() {
        let state = demo_graph();
        let out = calculate_layout(&state.nodes, &state.edges, &config());
        let s2 = out.iter().find(|n| n.id == "subtask-2").unwrap();
        assert_eq!(slot_at_position(s2.position.x + 5.0, Level::Subtask, &out), 1);
        assert_eq!(slot_at_position(-10_000.0, Level::Subtask, &out), 0);
        // No nodes at the level at all.
        assert_eq!(slot_at_position(0.0, Level::Subtask, &[]), 0);
    }
}

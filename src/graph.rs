use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_TITLE: &str = "Current Batch";

/// Depth tier of a node in the fixed three-level hierarchy.
///
/// Levels increase by exactly one along every edge, which is what makes
/// cycles structurally impossible in a well-formed graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    Root,
    Subtask,
    Todo,
}

impl Level {
    pub fn depth(self) -> u8 {
        match self {
            Self::Root => 0,
            Self::Subtask => 1,
            Self::Todo => 2,
        }
    }

    /// The level a child of this node must carry, if children are allowed.
    pub fn child(self) -> Option<Self> {
        match self {
            Self::Root => Some(Self::Subtask),
            Self::Subtask => Some(Self::Todo),
            Self::Todo => None,
        }
    }

    pub fn can_have_children(self) -> bool {
        !matches!(self, Self::Todo)
    }

    pub fn can_have_parent(self) -> bool {
        !matches!(self, Self::Root)
    }

    pub fn all() -> [Self; 3] {
        [Self::Root, Self::Subtask, Self::Todo]
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.depth()
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Root),
            1 => Ok(Self::Subtask),
            2 => Ok(Self::Todo),
            other => Err(format!("level out of range: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskNode {
    pub id: String,
    pub label: String,
    pub level: Level,
    pub slot: usize,
    /// Meaningful only on leaves. `None` round-trips as an absent field.
    pub completed: Option<bool>,
    pub position: Point,
}

impl TaskNode {
    pub fn is_completed(&self) -> bool {
        self.completed.unwrap_or(false)
    }
}

/// Directed parent→child edge. Wire-level decoration (type, animation,
/// stroke style) is reconstructed at the persistence boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// The single canonical state record the store owns. Cloned wholesale for
/// undo/redo snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphState {
    pub nodes: Vec<TaskNode>,
    pub edges: Vec<TaskEdge>,
    pub pinned_ids: Vec<String>,
    pub batch_title: String,
}

impl Default for GraphState {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            pinned_ids: Vec::new(),
            batch_title: DEFAULT_BATCH_TITLE.to_string(),
        }
    }
}

impl GraphState {
    pub fn node(&self, id: &str) -> Option<&TaskNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut TaskNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn count_at_level(&self, level: Level) -> usize {
        self.nodes.iter().filter(|node| node.level == level).count()
    }

    /// A node is a leaf when it has no outgoing edges.
    pub fn is_leaf(&self, id: &str) -> bool {
        !self.edges.iter().any(|edge| edge.source == id)
    }
}

/// Adjacency index from parent id to child ids, in edge order.
pub fn children_index<'a>(edges: &'a [TaskEdge]) -> HashMap<&'a str, Vec<&'a str>> {
    let mut index: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        index
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }
    index
}

/// Breadth-first closure of every descendant id reachable from `id`.
///
/// Shared by deletion, the drag protocol, and progress aggregation so the
/// traversal exists in exactly one place. Duplicate edges and malformed
/// back-references are tolerated via the seen set.
pub fn descendants(id: &str, edges: &[TaskEdge]) -> Vec<String> {
    let index = children_index(edges);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    let mut out = Vec::new();
    queue.push_back(id);
    while let Some(current) = queue.pop_front() {
        let Some(children) = index.get(current) else {
            continue;
        };
        for &child in children {
            if child != id && seen.insert(child) {
                out.push(child.to_string());
                queue.push_back(child);
            }
        }
    }
    out
}

fn demo_node(id: &str, label: &str, level: Level, slot: usize, completed: Option<bool>) -> TaskNode {
    TaskNode {
        id: id.to_string(),
        label: label.to_string(),
        level,
        slot,
        completed,
        position: Point::default(),
    }
}

fn demo_edge(id: &str, source: &str, target: &str) -> TaskEdge {
    TaskEdge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
    }
}

/// The canonical 7-node demo tree: one root, two subtasks, four todos.
pub fn demo_graph() -> GraphState {
    let nodes = vec![
        demo_node("root-1", "Root Task", Level::Root, 0, None),
        demo_node("subtask-1", "Subtask 1", Level::Subtask, 0, None),
        demo_node("subtask-2", "Subtask 2", Level::Subtask, 1, None),
        demo_node("todo-1-1", "Todo 1", Level::Todo, 0, Some(false)),
        demo_node("todo-1-2", "Todo 2", Level::Todo, 1, Some(false)),
        demo_node("todo-2-1", "Todo 1", Level::Todo, 2, Some(false)),
        demo_node("todo-2-2", "Todo 2", Level::Todo, 3, Some(false)),
    ];
    let edges = vec![
        demo_edge("edge-root-subtask1", "root-1", "subtask-1"),
        demo_edge("edge-root-subtask2", "root-1", "subtask-2"),
        demo_edge("edge-subtask1-todo1", "subtask-1", "todo-1-1"),
        demo_edge("edge-subtask1-todo2", "subtask-1", "todo-1-2"),
        demo_edge("edge-subtask2-todo1", "subtask-2", "todo-2-1"),
        demo_edge("edge-subtask2-todo2", "subtask-2", "todo-2-2"),
    ];
    GraphState {
        nodes,
        edges,
        pinned_ids: Vec::new(),
        batch_title: DEFAULT_BATCH_TITLE.to_string(),
    }
}

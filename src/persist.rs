//! Canonical persisted JSON format.
//!
//! The wire shape carries rendering decoration (`type`, `animated`, edge
//! stroke style, transient `selected`) that the in-memory model does not;
//! this module owns the conversion in both directions.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::graph::{DEFAULT_BATCH_TITLE, GraphState, Level, Point, TaskEdge, TaskNode};

pub const NODE_KIND: &str = "editableNode";
pub const EDGE_KIND: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDoc {
    pub nodes: Vec<WireNode>,
    pub edges: Vec<WireEdge>,
    #[serde(default, rename = "pinnedNodeIds")]
    pub pinned_node_ids: Vec<String>,
    #[serde(default = "default_batch_title", rename = "batchTitle")]
    pub batch_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNode {
    pub id: String,
    #[serde(rename = "type", default = "node_kind")]
    pub kind: String,
    pub position: Point,
    pub data: WireNodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireNodeData {
    pub label: String,
    pub level: Level,
    pub slot: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default = "edge_kind")]
    pub kind: String,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub style: WireEdgeStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEdgeStyle {
    pub stroke: String,
    #[serde(rename = "strokeWidth")]
    pub stroke_width: f32,
}

impl Default for WireEdgeStyle {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            stroke: config.edge_stroke,
            stroke_width: config.edge_stroke_width,
        }
    }
}

fn default_batch_title() -> String {
    DEFAULT_BATCH_TITLE.to_string()
}

fn node_kind() -> String {
    NODE_KIND.to_string()
}

fn edge_kind() -> String {
    EDGE_KIND.to_string()
}

pub fn to_wire(state: &GraphState, config: &EngineConfig) -> WireDoc {
    let nodes = state
        .nodes
        .iter()
        .map(|node| WireNode {
            id: node.id.clone(),
            kind: NODE_KIND.to_string(),
            position: node.position,
            data: WireNodeData {
                label: node.label.clone(),
                level: node.level,
                slot: node.slot,
                completed: node.completed,
            },
            selected: None,
        })
        .collect();
    let edges = state
        .edges
        .iter()
        .map(|edge| WireEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            kind: EDGE_KIND.to_string(),
            animated: false,
            style: WireEdgeStyle {
                stroke: config.edge_stroke.clone(),
                stroke_width: config.edge_stroke_width,
            },
        })
        .collect();
    WireDoc {
        nodes,
        edges,
        pinned_node_ids: state.pinned_ids.clone(),
        batch_title: state.batch_title.clone(),
    }
}

pub fn from_wire(doc: WireDoc) -> GraphState {
    let nodes = doc
        .nodes
        .into_iter()
        .map(|node| TaskNode {
            id: node.id,
            label: node.data.label,
            level: node.data.level,
            slot: node.data.slot,
            completed: node.data.completed,
            position: node.position,
        })
        .collect();
    let edges = doc
        .edges
        .into_iter()
        .map(|edge| TaskEdge {
            id: edge.id,
            source: edge.source,
            target: edge.target,
        })
        .collect();
    GraphState {
        nodes,
        edges,
        pinned_ids: doc.pinned_node_ids,
        batch_title: doc.batch_title,
    }
}

pub fn serialize(state: &GraphState, config: &EngineConfig) -> Result<String, EngineError> {
    Ok(serde_json::to_string_pretty(&to_wire(state, config))?)
}

pub fn deserialize(text: &str) -> Result<GraphState, EngineError> {
    let doc: WireDoc = serde_json::from_str(text)?;
    Ok(from_wire(doc))
}

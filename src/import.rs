//! Boundary for reduced documents emitted by the external graph producer.
//!
//! The producer sends only `{nodes: [{id, label, level, slot}], edges:
//! [{id, source, target}]}`; the full node/edge shape is reconstructed
//! here. Structurally invalid edges are dropped with a diagnostic rather
//! than failing the whole import.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::warn;

use crate::error::EngineError;
use crate::graph::{DEFAULT_BATCH_TITLE, GraphState, Level, Point, TaskEdge, TaskNode};

#[derive(Debug, Deserialize)]
pub struct ReducedDoc {
    pub nodes: Vec<ReducedNode>,
    #[serde(default)]
    pub edges: Vec<ReducedEdge>,
}

#[derive(Debug, Deserialize)]
pub struct ReducedNode {
    pub id: String,
    pub label: String,
    pub level: Level,
    pub slot: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReducedEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Parse a reduced document and rebuild full graph state. Positions are
/// zeroed; the caller is expected to run the layout afterwards.
pub fn import_reduced(text: &str) -> Result<GraphState, EngineError> {
    let doc: ReducedDoc = serde_json::from_str(strip_code_fences(text))?;
    Ok(reconstruct(doc))
}

pub fn reconstruct(doc: ReducedDoc) -> GraphState {
    let levels: HashMap<&str, Level> = doc
        .nodes
        .iter()
        .map(|node| (node.id.as_str(), node.level))
        .collect();

    let edges = doc
        .edges
        .iter()
        .filter(|edge| validate_edge(edge, &levels))
        .map(|edge| TaskEdge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
        })
        .collect();

    let nodes = doc
        .nodes
        .into_iter()
        .map(|node| TaskNode {
            id: node.id,
            label: node.label,
            level: node.level,
            slot: node.slot,
            completed: None,
            position: Point::default(),
        })
        .collect();

    GraphState {
        nodes,
        edges,
        pinned_ids: Vec::new(),
        batch_title: DEFAULT_BATCH_TITLE.to_string(),
    }
}

fn validate_edge(edge: &ReducedEdge, levels: &HashMap<&str, Level>) -> bool {
    let (Some(&source_level), Some(&target_level)) = (
        levels.get(edge.source.as_str()),
        levels.get(edge.target.as_str()),
    ) else {
        warn!(edge = %edge.id, "skipping edge: source or target node not found");
        return false;
    };
    if !source_level.can_have_children() {
        warn!(
            edge = %edge.id,
            level = source_level.depth(),
            "skipping edge: source node cannot have children"
        );
        return false;
    }
    if !target_level.can_have_parent() {
        warn!(
            edge = %edge.id,
            level = target_level.depth(),
            "skipping edge: target node cannot have a parent"
        );
        return false;
    }
    if source_level.child() != Some(target_level) {
        warn!(
            edge = %edge.id,
            source = source_level.depth(),
            target = target_level.depth(),
            "skipping edge: invalid level progression"
        );
        return false;
    }
    true
}

/// Producers wrap the document in a markdown code fence more often than
/// not; tolerate the common ``` and ```json forms.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Layout and wire-format constants for the engine.
///
/// Defaults reproduce the coordinates the original layout produced; a JSON
/// config file may override any subset of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Distance along the level axis between a parent and its children.
    pub level_spacing: f32,
    /// Gap along the sibling axis between adjacent subtree slices.
    pub node_spacing: f32,
    pub min_node_width: f32,
    pub max_node_width: f32,
    /// Horizontal label padding (left + right).
    pub label_padding: f32,
    /// Approximate character width used to estimate label extents.
    pub char_width: f32,
    /// Extra width reserved for the leaf checkbox and its gap.
    pub checkbox_width: f32,
    /// Root subtrees are separated by `node_spacing` times this factor.
    pub root_spacing_multiplier: f32,
    pub edge_stroke: String,
    pub edge_stroke_width: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            level_spacing: 220.0,
            node_spacing: 100.0,
            min_node_width: 120.0,
            max_node_width: 300.0,
            label_padding: 32.0,
            char_width: 8.0,
            checkbox_width: 28.0,
            root_spacing_multiplier: 2.0,
            edge_stroke: "#94a3b8".to_string(),
            edge_stroke_width: 2.5,
        }
    }
}

impl EngineConfig {
    /// Spacing inserted between independent root subtrees.
    pub fn root_spacing(&self) -> f32 {
        self.node_spacing * self.root_spacing_multiplier
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let contents = std::fs::read_to_string(path)?;
    let config: EngineConfig = serde_json::from_str(&contents)?;
    Ok(config)
}

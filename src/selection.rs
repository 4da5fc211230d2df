//! Selection summaries sent to the AI pipeline.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DprError, Result};

/// One selected layer, as sent with a prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// One selected frame or group, as sent with an analyze request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub width: f64,
    pub height: f64,
    /// Number of direct children.
    #[serde(default)]
    pub children: usize,
}

/// Parse a summary list; a single object is read as a list of one.
pub fn parse_summaries<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(DprError::Serialization))
        .collect()
}

pub fn load_summaries<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Err(DprError::Config(format!(
            "Selection file not found: {}",
            path.display()
        )));
    }
    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents)?;
    parse_summaries(value)
}

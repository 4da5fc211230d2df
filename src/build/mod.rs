//! Scene building from loosely structured actions.
//!
//! This module provides:
//! - [`extract_payload`] - One-level envelope unwrapping into a [`Payload`]
//! - [`normalize_verb`] / [`normalize_type`] - Free-text verbs and type hints to canonical form
//! - [`appliers`] - Capability-gated property appliers
//! - [`factory::create_node`] - Per-type node construction
//! - [`build_actions`] - Recursive construction of a whole action list

pub mod appliers;
pub mod builder;
pub mod factory;
pub mod normalize;
pub mod payload;

#[cfg(test)]
mod tests;

use std::fmt;

use thiserror::Error;

use crate::host::{FontName, HostError, NodeHandle};

pub use builder::{build_action, build_actions};
pub use normalize::{normalize_type, normalize_verb, ActionVerb, NodeType};
pub use payload::{extract_payload, Field, InvalidField, Payload, WRAPPER_KEYS};

/// Knobs the builder takes from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Font used for text actions without a well-formed `fontName`.
    pub default_font: FontName,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            default_font: FontName::default(),
        }
    }
}

/// Why an action was rejected before any node existed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    InvalidPayload,
    UnsupportedAction(String),
    UnsupportedType(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::InvalidPayload => {
                f.write_str("action is not an object payload or is wrapped more than once")
            }
            SkipReason::UnsupportedAction(verb) => write!(f, "unsupported action '{verb}'"),
            SkipReason::UnsupportedType(kind) => write!(f, "unsupported node type '{kind}'"),
        }
    }
}

/// Why an action failed after construction started.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildFailure {
    #[error("Failed to load font {font}: {message}")]
    FontUnavailable { font: FontName, message: String },
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result of building one action.
#[derive(Debug)]
pub enum ActionOutcome {
    Built(NodeHandle),
    Skipped(SkipReason),
    Failed(BuildFailure),
}

impl ActionOutcome {
    pub fn node(self) -> Option<NodeHandle> {
        match self {
            ActionOutcome::Built(node) => Some(node),
            _ => None,
        }
    }
}

/// Aggregate result of building an action list.
///
/// Counters include nested children; `nodes` holds only root-level nodes in
/// input order.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub nodes: Vec<NodeHandle>,
    pub built: usize,
    pub skipped: usize,
    pub failed: usize,
    pub warnings: Vec<String>,
}

impl BuildReport {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn record(&mut self, outcome: &ActionOutcome) {
        match outcome {
            ActionOutcome::Built(_) => self.built += 1,
            ActionOutcome::Skipped(_) => self.skipped += 1,
            ActionOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.warnings.push(message);
    }
}

//! Design Predictor (DPR) Library
//!
//! Turns loosely structured AI output into design nodes. A pipeline response is
//! reduced to its output text, parsed into an action list, and each action is
//! built into a host document through a capability-checked interface.
//!
//! # Module Overview
//!
//! - [`response`] - Output text extraction and action-list parsing
//! - [`build`] - Payload extraction, normalization, node factory, recursive builder
//! - [`host`] - Host document interface and property model
//! - [`scene`] - In-memory host document
//! - [`pipeline_client`] - Pipeline calls through the proxy or direct API
//! - [`predict`] - End-to-end orchestration
//! - [`config`] - Configuration file support
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use dpr_lib::build::BuildOptions;
//! use dpr_lib::predict::{interpret_response, materialize};
//! use dpr_lib::{SceneDocument, Viewport};
//!
//! # async fn example(response: serde_json::Value) -> dpr_lib::Result<()> {
//! let actions = interpret_response(&response)?;
//! let mut doc = SceneDocument::new(Viewport::default());
//! let prediction = materialize(&mut doc, actions, &BuildOptions::default(), None).await?;
//! println!("built {} nodes", prediction.report.built);
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod coerce;
pub mod config;
pub mod error;
pub mod host;
pub mod output;
pub mod pipeline_client;
pub mod predict;
pub mod progress;
pub mod response;
pub mod scene;
pub mod selection;
pub mod viewport;

pub use build::{build_actions, ActionOutcome, BuildOptions, BuildReport};
pub use config::{Config, PipelineMode};
pub use error::{DprError, ErrorCategory, ErrorPayload, Result};
pub use host::{Capabilities, Document, FontName, HostError, NodeHandle, NodeKind, Property};
pub use output::{
    AnalyzeOutput, BuildSummary, DprOutput, ErrorOutput, SceneOutput, DPR_OUTPUT_VERSION,
};
pub use pipeline_client::PipelineClient;
pub use predict::{interpret_response, materialize, predict, Prediction};
pub use progress::ProgressCallback;
pub use scene::{SceneDocument, SceneSnapshot};
pub use selection::{load_summaries, DesignSummary, LayerSummary};
pub use viewport::{Viewport, ViewportFrame};

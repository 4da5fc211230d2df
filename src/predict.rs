//! End-to-end prediction: pipeline response to actions to nodes.

use serde_json::Value;

use crate::build::{build_actions, BuildOptions, BuildReport};
use crate::host::Document;
use crate::pipeline_client::PipelineClient;
use crate::selection::LayerSummary;
use crate::{DprError, ProgressCallback, Result};

pub use crate::response::interpret_response;

/// Parsed actions together with what the builder made of them.
#[derive(Debug)]
pub struct Prediction {
    pub actions: Vec<Value>,
    pub report: BuildReport,
}

/// Build `actions` into `doc` and focus the resulting root nodes.
///
/// Fails with [`DprError::NoSupportedActions`] when no action produced a node;
/// nodes from partially failed lists are kept.
pub async fn materialize<D: Document>(
    doc: &mut D,
    actions: Vec<Value>,
    options: &BuildOptions,
    progress: Option<&ProgressCallback>,
) -> Result<Prediction> {
    if let Some(cb) = progress {
        cb(&format!("Building {} actions...", actions.len()));
    }
    let report = build_actions(doc, &actions, options, progress).await;
    if report.is_empty() {
        return Err(DprError::NoSupportedActions);
    }

    doc.focus(&report.nodes);
    Ok(Prediction { actions, report })
}

/// Ask the pipeline for a prediction and build it into `doc`.
pub async fn predict<D: Document>(
    client: &PipelineClient,
    doc: &mut D,
    selection: &[LayerSummary],
    options: &BuildOptions,
    progress: Option<&ProgressCallback>,
) -> Result<Prediction> {
    let response = client.request_prediction(selection, progress).await?;
    let actions = interpret_response(&response)?;
    tracing::debug!(actions = actions.len(), "prediction parsed");
    materialize(doc, actions, options, progress).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneDocument;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn materialize_focuses_built_roots() {
        let mut doc = SceneDocument::default();
        let actions = vec![
            json!({"type": "RECTANGLE", "x": 0, "y": 0, "width": 100, "height": 100}),
            json!({"type": "BLOB"}),
            json!({"type": "ELLIPSE", "x": 200, "y": 0, "width": 100, "height": 100}),
        ];

        let prediction = materialize(&mut doc, actions, &BuildOptions::default(), None)
            .await
            .expect("prediction");

        assert_eq!(prediction.actions.len(), 3);
        assert_eq!(prediction.report.nodes.len(), 2);
        assert_eq!(prediction.report.skipped, 1);
        assert_eq!(doc.selection().len(), 2);
        let frame = doc.frame().expect("frame");
        assert_eq!((frame.center_x, frame.center_y), (150.0, 50.0));
        assert_eq!(frame.zoom, 1.0);
    }

    #[tokio::test]
    async fn all_unsupported_is_an_aggregate_error() {
        let mut doc = SceneDocument::default();
        let actions = vec![json!({"type": "BLOB"}), json!({"action": "DELETE"})];

        let err = materialize(&mut doc, actions, &BuildOptions::default(), None)
            .await
            .expect_err("nothing built");

        assert!(matches!(err, DprError::NoSupportedActions));
        assert!(doc.is_empty());
        assert!(doc.frame().is_none());
    }

    #[tokio::test]
    async fn response_to_scene_round_trip() {
        let response = json!({
            "success": true,
            "data": {"output": "```json\n[{\"type\":\"frame\",\"name\":\"Card\",\"children\":[{\"type\":\"text\",\"characters\":\"Hi\"}]}]\n```"}
        });
        let actions = interpret_response(&response).expect("actions");
        let mut doc = SceneDocument::default();

        let prediction = materialize(&mut doc, actions, &BuildOptions::default(), None)
            .await
            .expect("prediction");

        assert_eq!(prediction.report.built, 2);
        let snapshot = doc.snapshot();
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].node.name, "Card");
        assert_eq!(snapshot.nodes[0].children.len(), 1);
    }

    #[tokio::test]
    async fn progress_reports_the_action_count() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress: ProgressCallback = Arc::new(move |msg: &str| {
            sink.lock().expect("lock").push(msg.to_string());
        });
        let mut doc = SceneDocument::default();

        materialize(
            &mut doc,
            vec![json!({"type": "FRAME"})],
            &BuildOptions::default(),
            Some(&progress),
        )
        .await
        .expect("prediction");

        let seen = seen.lock().expect("lock");
        assert_eq!(seen[0], "Building 1 actions...");
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ErrorPayload;
use crate::predict::Prediction;
use crate::scene::SceneSnapshot;

/// Schema version for output payloads.
pub const DPR_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DprOutput {
    Predict(SceneOutput),
    Render(SceneOutput),
    Analyze(AnalyzeOutput),
    Error(ErrorOutput),
}

/// Parsed actions and the scene they produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneOutput {
    pub version: String,
    pub actions: Vec<Value>,
    pub scene: SceneSnapshot,
    pub summary: BuildSummary,
}

impl SceneOutput {
    pub fn new(prediction: Prediction, scene: SceneSnapshot) -> Self {
        let report = prediction.report;
        Self {
            version: DPR_OUTPUT_VERSION.to_string(),
            actions: prediction.actions,
            scene,
            summary: BuildSummary {
                built: report.built,
                skipped: report.skipped,
                failed: report.failed,
                warnings: report.warnings,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    pub built: usize,
    pub skipped: usize,
    pub failed: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput {
    pub version: String,
    /// Number of frames or groups sent for review.
    pub designs: usize,
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::BuildReport;
    use crate::scene::SceneDocument;
    use serde_json::json;

    #[test]
    fn render_output_serializes() {
        let report = BuildReport {
            built: 1,
            skipped: 1,
            warnings: vec!["Skipped action: unsupported node type 'BLOB'".to_string()],
            ..BuildReport::default()
        };
        let prediction = Prediction {
            actions: vec![json!({"type": "BLOB"})],
            report,
        };
        let output = DprOutput::Render(SceneOutput::new(
            prediction,
            SceneDocument::default().snapshot(),
        ));

        let json = serde_json::to_value(&output).expect("serialize render output");
        assert_eq!(json["mode"], "render");
        assert_eq!(json["version"], DPR_OUTPUT_VERSION);
        assert_eq!(json["summary"]["skipped"], 1);
        assert_eq!(json["scene"]["viewport"]["width"], 1440);
        assert!(json["summary"]["warnings"][0]
            .as_str()
            .unwrap_or_default()
            .contains("BLOB"));
    }

    #[test]
    fn analyze_output_serializes() {
        let output = DprOutput::Analyze(AnalyzeOutput {
            version: DPR_OUTPUT_VERSION.to_string(),
            designs: 2,
            feedback: "Increase contrast on the header.".to_string(),
        });

        let json = serde_json::to_string(&output).expect("serialize analyze output");
        assert!(json.contains("\"mode\":\"analyze\""));
        assert!(json.contains("\"designs\":2"));
    }

    #[test]
    fn empty_warnings_are_omitted() {
        let summary = BuildSummary {
            built: 3,
            skipped: 0,
            failed: 0,
            warnings: Vec::new(),
        };
        let json = serde_json::to_value(&summary).expect("serialize summary");
        assert!(json.get("warnings").is_none());
    }
}

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum DprError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    /// The pipeline answered but reported failure (non-2xx or `success: false`).
    #[error("{message}")]
    Pipeline {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Empty proxy response (status {status})")]
    EmptyResponse { status: u16 },

    #[error("Proxy returned non-JSON response")]
    NonJsonResponse,

    #[error("No actions returned from AI")]
    NoActions,

    #[error("AI response was empty")]
    EmptyOutput,

    #[error("Failed to parse AI response: {0}")]
    Decode(serde_json::Error),

    #[error("No supported actions returned from AI")]
    NoSupportedActions,

    #[error("Please select a frame or group.")]
    EmptySelection,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl DprError {
    pub fn pipeline(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        DprError::Pipeline {
            status,
            message: message.into(),
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            DprError::Io(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            DprError::Network(e) => ErrorPayload::new(
                ErrorCategory::Network,
                e.to_string(),
                "Check that the proxy is running (default http://localhost:8000) and retry.",
            ),
            DprError::InvalidUrl(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Verify pipeline.proxy_url / pipeline.base_url in the config file.",
            ),
            DprError::Pipeline { status, message } => {
                let message = match status {
                    Some(status) => {
                        format!("Pipeline error (status {}): {}", status.as_u16(), message)
                    }
                    None => message.clone(),
                };
                ErrorPayload::new(
                    ErrorCategory::Pipeline,
                    message,
                    "Check the saved item id and API credentials; retry after the run finishes.",
                )
            }
            DprError::EmptyResponse { .. } | DprError::NonJsonResponse => ErrorPayload::new(
                ErrorCategory::Response,
                self.to_string(),
                "Inspect the proxy logs; the pipeline output could not be read.",
            ),
            DprError::NoActions | DprError::EmptyOutput => ErrorPayload::new(
                ErrorCategory::Response,
                self.to_string(),
                "The pipeline finished without output; check the flow's output node.",
            ),
            DprError::Decode(_) => ErrorPayload::new(
                ErrorCategory::Decode,
                self.to_string(),
                "The AI output is not valid JSON; run with --verbose to see the raw text.",
            ),
            DprError::NoSupportedActions => ErrorPayload::new(
                ErrorCategory::Build,
                self.to_string(),
                "None of the returned actions could be built; run with --verbose to see why each was skipped.",
            ),
            DprError::EmptySelection => ErrorPayload::new(
                ErrorCategory::Config,
                self.to_string(),
                "Pass a selection file with at least one frame or group.",
            ),
            DprError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Config,
                e.to_string(),
                "Check JSON inputs; run with --verbose for details.",
            ),
            DprError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("api_key") || lower.contains("user_id") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set DPR_API_KEY / DPR_USER_ID or pipeline.api_key / pipeline.user_id, or use proxy mode.",
                    )
                } else if lower.contains("saved_item_id") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set pipeline.saved_item_id in the config file.",
                    )
                } else if lower.contains("font") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Write fonts as \"Family:Style\" (e.g., \"Inter:Regular\").",
                    )
                } else if lower.contains("file not found") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Verify the file exists; use an absolute path or run from the working directory.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths (e.g., --viewport WIDTHxHEIGHT) and the config file.",
                    )
                }
            }
            DprError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, DprError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Network,
    Pipeline,
    Response,
    Decode,
    Build,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use tokio::time::{sleep, Instant};
use url::Url;

use crate::config::{AnalyzeConfig, Config, PipelineConfig, PipelineMode, Timeouts};
use crate::error::{DprError, Result};
use crate::selection::{DesignSummary, LayerSummary};
use crate::ProgressCallback;

/// Feedback text when polling ends without a terminal status.
pub const NO_FEEDBACK: &str = "No feedback returned.";
/// Feedback text when the pipeline reports failure.
pub const PIPELINE_FAILED: &str = "Pipeline failed.";

/// Client for the AI pipeline, either through the local proxy or direct.
#[derive(Debug, Clone)]
pub struct PipelineClient {
    http: Client,
    pipeline: PipelineConfig,
    timeouts: Timeouts,
    analyze: AnalyzeConfig,
    proxy_url: Url,
    base_url: Url,
}

/// Outcome of one poll of a pipeline run.
enum RunState {
    Done(Value),
    Failed(Value),
    Pending,
}

impl PipelineClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeouts.request)
            .build()
            .map_err(DprError::Network)?;

        Ok(Self {
            http,
            pipeline: config.pipeline.clone(),
            timeouts: config.timeouts.clone(),
            analyze: config.analyze.clone(),
            proxy_url: directory_url(&config.pipeline.proxy_url)?,
            base_url: directory_url(&config.pipeline.base_url)?,
        })
    }

    pub fn mode(&self) -> PipelineMode {
        self.pipeline.mode
    }

    /// Send the selection for prediction and return the raw pipeline response.
    ///
    /// The response still has to go through output extraction.
    pub async fn request_prediction(
        &self,
        selection: &[LayerSummary],
        progress: Option<&ProgressCallback>,
    ) -> Result<Value> {
        let figma_json = serde_json::to_string(selection)?;
        tracing::debug!(
            layers = selection.len(),
            mode = ?self.pipeline.mode,
            "requesting prediction"
        );

        match self.pipeline.mode {
            PipelineMode::Proxy => {
                report(progress, "Calling pipeline via proxy...");
                self.run_via_proxy(&figma_json).await
            }
            PipelineMode::Direct => {
                report(progress, "Starting pipeline run...");
                let run_id = self
                    .start_pipeline(
                        &self.pipeline.saved_item_id,
                        &json!({ "figma_json": figma_json }),
                    )
                    .await?;
                report(progress, &format!("Waiting for run {run_id}..."));
                let run = self.wait_for_run(&run_id).await?;
                Ok(json!({ "success": true, "data": run }))
            }
        }
    }

    /// `POST {proxy}/run-flow`; the proxy starts the run and waits for it.
    pub async fn run_via_proxy(&self, figma_json: &str) -> Result<Value> {
        let url = endpoint(&self.proxy_url, "run-flow")?;
        let request = self
            .http
            .post(url)
            .query(&[("saved_item_id", self.pipeline.saved_item_id.as_str())])
            .json(&json!({ "figma_json": figma_json }));

        let response = request.send().await.map_err(DprError::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(DprError::Network)?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "proxy responded");

        if body.is_empty() {
            return Err(DprError::EmptyResponse {
                status: status.as_u16(),
            });
        }
        let value: Value =
            serde_json::from_str(&body).map_err(|_| DprError::NonJsonResponse)?;

        if !status.is_success() && value.get("success").is_none() {
            return Err(DprError::pipeline(Some(status), error_message(status, &body)));
        }
        Ok(value)
    }

    /// Start a saved pipeline and return its run id.
    pub async fn start_pipeline(&self, saved_item_id: &str, body: &Value) -> Result<String> {
        let url = endpoint(&self.base_url, "start_pipeline")?;
        let request = self
            .authed(self.http.post(url))?
            .query(&[("saved_item_id", saved_item_id)])
            .json(body);

        let response = request.send().await.map_err(DprError::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(DprError::Network)?;
        if !status.is_success() {
            return Err(DprError::pipeline(
                Some(status),
                format!("Failed to start pipeline: {}", error_message(status, &body)),
            ));
        }

        let value: Value = serde_json::from_str(&body).map_err(|_| DprError::NonJsonResponse)?;
        match value.get("run_id").and_then(Value::as_str) {
            Some(run_id) if !run_id.is_empty() => {
                tracing::info!(run_id, "pipeline started");
                Ok(run_id.to_string())
            }
            _ => Err(DprError::pipeline(
                Some(StatusCode::BAD_REQUEST),
                "No run_id returned from pipeline",
            )),
        }
    }

    /// Poll a run every `poll_interval` until it finishes or `poll_timeout` elapses.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<Value> {
        let deadline = Instant::now() + self.timeouts.poll_timeout;
        let mut attempt = 0u32;

        while Instant::now() < deadline {
            attempt += 1;
            match self.fetch_run(run_id).await? {
                RunState::Done(run) => return Ok(run),
                RunState::Failed(run) => {
                    let message = run
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or("Pipeline run failed")
                        .to_string();
                    return Err(DprError::pipeline(Some(StatusCode::BAD_REQUEST), message));
                }
                RunState::Pending => {
                    tracing::debug!(attempt, run_id, "run still pending");
                    sleep(self.timeouts.poll_interval).await;
                }
            }
        }

        Err(DprError::pipeline(
            Some(StatusCode::GATEWAY_TIMEOUT),
            format!(
                "Pipeline did not complete within {}s",
                self.timeouts.poll_timeout.as_secs()
            ),
        ))
    }

    /// Long-poll design feedback for the selected frames.
    ///
    /// Stops after the configured number of attempts; always yields text once
    /// the run has started.
    pub async fn analyze(
        &self,
        designs: &[DesignSummary],
        progress: Option<&ProgressCallback>,
    ) -> Result<String> {
        if designs.is_empty() {
            return Err(DprError::EmptySelection);
        }

        let summary = serde_json::to_string(designs)?;
        report(progress, "Starting analysis...");
        let run_id = self
            .start_pipeline(
                &self.analyze.saved_item_id,
                &json!({ "inputs": { "design_summary": summary } }),
            )
            .await?;

        for attempt in 1..=self.analyze.attempts {
            sleep(self.analyze.delay).await;
            report(
                progress,
                &format!("Polling feedback ({attempt}/{})...", self.analyze.attempts),
            );
            match self.fetch_run(&run_id).await? {
                RunState::Done(run) => return Ok(feedback_text(&run)),
                RunState::Failed(_) => return Ok(PIPELINE_FAILED.to_string()),
                RunState::Pending => {}
            }
        }

        tracing::warn!(
            run_id = %run_id,
            attempts = self.analyze.attempts,
            "no feedback before attempts ran out"
        );
        Ok(NO_FEEDBACK.to_string())
    }

    async fn fetch_run(&self, run_id: &str) -> Result<RunState> {
        let url = endpoint(&self.base_url, "get_pl_run")?;
        let request = self.authed(self.http.get(url))?.query(&[("run_id", run_id)]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) if err.is_timeout() => {
                tracing::debug!(run_id, "poll request timed out");
                return Ok(RunState::Pending);
            }
            Err(err) => return Err(DprError::Network(err)),
        };
        let status = response.status();

        if status.is_server_error() {
            tracing::debug!(run_id, status = status.as_u16(), "server error while polling");
            return Ok(RunState::Pending);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DprError::pipeline(Some(status), error_message(status, &body)));
        }

        let run = read_json(response).await?;
        Ok(run_state(run))
    }

    fn authed(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let api_key = self.pipeline.api_key.as_deref().ok_or_else(|| {
            DprError::Config("pipeline.api_key is required to call the pipeline directly".into())
        })?;
        let user_id = self.pipeline.user_id.as_deref().ok_or_else(|| {
            DprError::Config("pipeline.user_id is required to call the pipeline directly".into())
        })?;
        Ok(builder
            .header("x-api-key", api_key)
            .query(&[("api_key", api_key), ("user_id", user_id)]))
    }
}

fn report(progress: Option<&ProgressCallback>, message: &str) {
    if let Some(cb) = progress {
        cb(message);
    }
}

/// Parse `raw` and make sure its path ends in `/` so relative joins append.
fn directory_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn endpoint(base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(DprError::InvalidUrl)
}

async fn read_json(response: Response) -> Result<Value> {
    let body = response.text().await.map_err(DprError::Network)?;
    serde_json::from_str(&body).map_err(|_| DprError::NonJsonResponse)
}

/// Classify a run record by `state` (`DONE` / `FAILED`) or `status`
/// (`completed` / `failed`).
fn run_state(run: Value) -> RunState {
    let marker = run
        .get("state")
        .or_else(|| run.get("status"))
        .and_then(Value::as_str)
        .map(str::to_ascii_uppercase);

    match marker.as_deref() {
        Some("DONE") | Some("COMPLETED") => RunState::Done(run),
        Some("FAILED") => RunState::Failed(run),
        _ => RunState::Pending,
    }
}

fn feedback_text(run: &Value) -> String {
    let outputs = run.get("outputs").cloned().unwrap_or(Value::Null);
    match outputs.get("feedback") {
        Some(Value::String(text)) => text.clone(),
        Some(other) if !other.is_null() => other.to_string(),
        _ => serde_json::to_string_pretty(&outputs).unwrap_or_else(|_| NO_FEEDBACK.to_string()),
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let fallback = format!("Pipeline returned status {}", status.as_u16());
    let parsed = serde_json::from_str::<Value>(body).ok();
    let from_body = parsed
        .as_ref()
        .and_then(|value| {
            value
                .get("detail")
                .or_else(|| value.get("error"))
                .or_else(|| value.get("message"))
        })
        .and_then(Value::as_str)
        .map(str::to_owned);

    match from_body {
        Some(msg) => msg,
        None if !body.trim().is_empty() && parsed.is_none() => body.trim().to_string(),
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_url_keeps_api_prefix() {
        let base = directory_url("https://api.gumloop.com/api/v1").expect("url");
        assert_eq!(
            endpoint(&base, "start_pipeline").expect("endpoint").as_str(),
            "https://api.gumloop.com/api/v1/start_pipeline"
        );

        let proxy = directory_url("http://localhost:8000").expect("url");
        assert_eq!(
            endpoint(&proxy, "run-flow").expect("endpoint").as_str(),
            "http://localhost:8000/run-flow"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            directory_url("not a url"),
            Err(DprError::InvalidUrl(_))
        ));
    }

    #[test]
    fn run_state_reads_state_or_status() {
        assert!(matches!(run_state(json!({"state": "DONE"})), RunState::Done(_)));
        assert!(matches!(run_state(json!({"status": "completed"})), RunState::Done(_)));
        assert!(matches!(run_state(json!({"state": "FAILED"})), RunState::Failed(_)));
        assert!(matches!(run_state(json!({"state": "RUNNING"})), RunState::Pending));
        assert!(matches!(run_state(json!({})), RunState::Pending));
    }

    #[test]
    fn feedback_prefers_feedback_output() {
        assert_eq!(
            feedback_text(&json!({"outputs": {"feedback": "Looks good"}})),
            "Looks good"
        );
        let pretty = feedback_text(&json!({"outputs": {"score": 3}}));
        assert!(pretty.contains("\"score\": 3"));
    }

    #[test]
    fn error_message_prefers_body_detail() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"detail": "No run_id"}"#),
            "No run_id"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, ""),
            "Pipeline returned status 502"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "upstream down"),
            "upstream down"
        );
    }

    #[test]
    fn direct_calls_require_credentials() {
        let client = PipelineClient::new(&Config::default()).expect("client");
        let builder = client.http.get("http://localhost/");
        assert!(matches!(client.authed(builder), Err(DprError::Config(_))));
    }
}

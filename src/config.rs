use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use crate::host::FontName;
use crate::scene::ComponentDef;
use crate::Viewport;

pub const API_KEY_ENV: &str = "DPR_API_KEY";
pub const USER_ID_ENV: &str = "DPR_USER_ID";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_viewport")]
    pub viewport: Viewport,
    pub pipeline: PipelineConfig,
    pub timeouts: Timeouts,
    pub analyze: AnalyzeConfig,
    pub document: DocumentConfig,
}

/// How predictions reach the AI pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Through the local proxy's `/run-flow` endpoint.
    Proxy,
    /// Straight to the pipeline API, polling for the run result.
    Direct,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub mode: PipelineMode,
    pub proxy_url: String,
    pub base_url: String,
    pub saved_item_id: String,
    pub api_key: Option<String>,
    pub user_id: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::Proxy,
            proxy_url: "http://localhost:8000".to_string(),
            base_url: "https://api.gumloop.com/api/v1".to_string(),
            saved_item_id: "sbTctfNvijqsLZMHmXXqpi".to_string(),
            api_key: None,
            user_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub request: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub poll_timeout: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
            poll_timeout: Duration::from_secs(60),
        }
    }
}

/// Long-poll settings for design feedback.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzeConfig {
    pub saved_item_id: String,
    pub attempts: u32,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            saved_item_id: "99LLfeNiFK8Zr6tMG2DiDm".to_string(),
            attempts: 8,
            delay: Duration::from_millis(1500),
        }
    }
}

/// What the in-memory document offers to the builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Installed fonts as `"Family:Style"`.
    pub fonts: Vec<String>,
    pub default_font: String,
    pub components: Vec<ComponentDef>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            fonts: ["Inter:Regular", "Inter:Medium", "Inter:Bold", "Roboto:Regular"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            default_font: "Inter:Regular".to_string(),
            components: Vec::new(),
        }
    }
}

impl DocumentConfig {
    /// Parsed font list; malformed entries are rejected by [`Config::validate`].
    pub fn font_names(&self) -> Vec<FontName> {
        self.fonts
            .iter()
            .filter_map(|spec| FontName::parse_spec(spec))
            .collect()
    }

    pub fn default_font_name(&self) -> FontName {
        FontName::parse_spec(&self.default_font).unwrap_or_default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            pipeline: PipelineConfig::default(),
            timeouts: Timeouts::default(),
            analyze: AnalyzeConfig::default(),
            document: DocumentConfig::default(),
        }
    }
}

fn deserialize_viewport<'de, D>(deserializer: D) -> Result<Viewport, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl Config {
    /// `$XDG_CONFIG_HOME/dpr/config.toml`, else `~/.config/dpr/config.toml`.
    pub fn central_config_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join("dpr").join("config.toml"))
    }

    /// Load from `path`, else the central config if it exists, else defaults.
    /// Credentials from the environment override file values.
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let source = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.exists()),
        };

        let mut config = match source {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("File not found or unreadable: {} ({e})", path.display()))?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            serde_yaml::from_str(&contents).map_err(|e| e.to_string())
        } else {
            toml::from_str(&contents).map_err(|e| e.to_string())
        }
    }

    fn apply_env(&mut self) {
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            self.pipeline.api_key = Some(key);
        }
        if let Some(user) = non_empty_env(USER_ID_ENV) {
            self.pipeline.user_id = Some(user);
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.pipeline.proxy_url.trim().is_empty() {
            return Err("pipeline.proxy_url must not be empty".to_string());
        }
        if self.pipeline.base_url.trim().is_empty() {
            return Err("pipeline.base_url must not be empty".to_string());
        }
        if self.timeouts.poll_interval.is_zero() {
            return Err("timeouts.poll_interval must be greater than zero".to_string());
        }
        if self.analyze.attempts == 0 {
            return Err("analyze.attempts must be at least 1".to_string());
        }
        if let Some(bad) = self
            .document
            .fonts
            .iter()
            .find(|spec| FontName::parse_spec(spec).is_none())
        {
            return Err(format!("Invalid font '{bad}': expected \"Family:Style\""));
        }
        if FontName::parse_spec(&self.document.default_font).is_none() {
            return Err(format!(
                "Invalid default font '{}': expected \"Family:Style\"",
                self.document.default_font
            ));
        }
        Ok(())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

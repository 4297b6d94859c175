use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::options::{ArtStyle, DrawingTool, GenerationParams, Quality};

pub const SETTINGS_FILE: &str = "settings.json";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const REPLICATE_API_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// When enabled the application initialises the logger at debug level.
    /// Defaults to `false` when the field is missing in the settings file.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Key for the vision endpoint. Falls back to `OPENAI_API_KEY`.
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// Token for the inference service. Falls back to `REPLICATE_API_TOKEN`.
    #[serde(default)]
    pub replicate_api_token: Option<String>,
    #[serde(default = "default_describe_endpoint")]
    pub describe_endpoint: String,
    #[serde(default = "default_describe_model")]
    pub describe_model: String,
    /// Cap on the description length in tokens.
    #[serde(default = "default_describe_max_tokens")]
    pub describe_max_tokens: u32,
    #[serde(default = "default_replicate_api_base")]
    pub replicate_api_base: String,
    #[serde(default = "default_synthesis_version")]
    pub synthesis_version: String,
    /// Quiet period after the last canvas change before a generation starts.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Per-request timeout in seconds. `None` waits forever.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound on how long a queued prediction is polled.
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,
    #[serde(default)]
    pub default_tool: DrawingTool,
    #[serde(default = "default_stroke_width")]
    pub default_stroke_width: u32,
    #[serde(default)]
    pub default_quality: Quality,
    #[serde(default)]
    pub default_style: ArtStyle,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
}

fn default_describe_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}

fn default_describe_model() -> String {
    "gpt-4o-mini".into()
}

fn default_describe_max_tokens() -> u32 {
    20
}

fn default_replicate_api_base() -> String {
    "https://api.replicate.com/v1".into()
}

fn default_synthesis_version() -> String {
    crate::remote::synthesis::CONTROLNET_SCRIBBLE_VERSION.into()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_request_timeout_secs() -> Option<u64> {
    Some(120)
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_timeout_secs() -> u64 {
    600
}

fn default_stroke_width() -> u32 {
    crate::options::DEFAULT_STROKE_WIDTH
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug_logging: false,
            log_file: None,
            openai_api_key: None,
            replicate_api_token: None,
            describe_endpoint: default_describe_endpoint(),
            describe_model: default_describe_model(),
            describe_max_tokens: default_describe_max_tokens(),
            replicate_api_base: default_replicate_api_base(),
            synthesis_version: default_synthesis_version(),
            debounce_ms: default_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_timeout_secs: default_poll_timeout_secs(),
            default_tool: DrawingTool::default(),
            default_stroke_width: default_stroke_width(),
            default_quality: Quality::default(),
            default_style: ArtStyle::default(),
            enable_toasts: default_toasts(),
            toast_duration: default_toast_duration(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self =
            serde_json::from_str(&content).with_context(|| format!("parse {path}"))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("write {path}"))?;
        Ok(())
    }

    /// Rejects endpoints that are not absolute http(s) URLs.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("describe_endpoint", &self.describe_endpoint),
            ("replicate_api_base", &self.replicate_api_base),
        ] {
            let url = url::Url::parse(value).with_context(|| format!("{name} is not a url"))?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("{name} must use http or https, got `{}`", url.scheme());
            }
        }
        if self.synthesis_version.trim().is_empty() {
            anyhow::bail!("synthesis_version must not be empty");
        }
        Ok(())
    }

    pub fn openai_api_key(&self) -> Option<String> {
        credential(self.openai_api_key.as_deref(), OPENAI_API_KEY_ENV)
    }

    pub fn replicate_api_token(&self) -> Option<String> {
        credential(self.replicate_api_token.as_deref(), REPLICATE_API_TOKEN_ENV)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(50))
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Sidebar selections on startup.
    pub fn initial_params(&self) -> GenerationParams {
        GenerationParams::new(
            self.default_tool,
            self.default_stroke_width,
            self.default_quality,
            self.default_style,
        )
    }
}

fn credential(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| {
            std::env::var(env_var)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
}

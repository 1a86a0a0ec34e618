use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub inference: InferenceConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tuning: TuningConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Anthropic,
    Ollama,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InferenceConfig {
    pub provider: Provider,
    pub endpoint: String,
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Only ever filled from `ANTHROPIC_API_KEY`.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl InferenceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_server_name")]
    pub name: String,
    #[serde(default = "default_http_bind")]
    pub http_bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            http_bind: default_http_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Token budget and sampling temperature for one kind of model call.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CallSettings {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CallSettings {
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TuningConfig {
    #[serde(default = "TuningConfig::summarize_default")]
    pub summarize: CallSettings,
    #[serde(default = "TuningConfig::sentiment_default")]
    pub sentiment: CallSettings,
    #[serde(default = "TuningConfig::translate_default")]
    pub translate: CallSettings,
    #[serde(default = "TuningConfig::selection_default")]
    pub selection: CallSettings,
    #[serde(default = "TuningConfig::presentation_default")]
    pub presentation: CallSettings,
}

impl TuningConfig {
    fn summarize_default() -> CallSettings {
        CallSettings::new(1024, 0.0)
    }

    fn sentiment_default() -> CallSettings {
        CallSettings::new(50, 0.1)
    }

    fn translate_default() -> CallSettings {
        CallSettings::new(2048, 0.3)
    }

    // Tool choice should be deterministic.
    fn selection_default() -> CallSettings {
        CallSettings::new(512, 0.0)
    }

    fn presentation_default() -> CallSettings {
        CallSettings::new(2048, 0.7)
    }
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            summarize: Self::summarize_default(),
            sentiment: Self::sentiment_default(),
            translate: Self::translate_default(),
            selection: Self::selection_default(),
            presentation: Self::presentation_default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_server_name() -> String {
    "text-tools".to_string()
}

fn default_http_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| {
            format!(
                "Failed to read config file {}. Make sure it exists.",
                path.display()
            )
        })?;

        let mut config = Self::parse(&content)?;
        config.apply_env_overrides();

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Override selected values with environment variables if set
    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("INFERENCE_ENDPOINT") {
            self.inference.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("INFERENCE_MODEL") {
            self.inference.model = model;
        }
        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            self.inference.api_key = Some(key);
        }
    }
}

//! Configuration loading, validation, and management for Smithers.
//!
//! Loads configuration from `~/.smithers/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.smithers/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider name; selects the default base URL
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Base URL override (e.g. a local proxy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Max tokens per response; unset leaves it to the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_max_tokens: Option<u32>,

    /// HTTP request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Assistant behaviour
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Graph rendering
    #[serde(default)]
    pub visualizer: VisualizerConfig,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("api_url", &self.api_url)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("assistant", &self.assistant)
            .field("visualizer", &self.visualizer)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Most-recent entries sent with each chat; unset sends the full history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_window: Option<usize>,

    /// Entries retrieved per `rag` query
    #[serde(default = "default_rag_limit")]
    pub rag_limit: usize,

    /// Characters kept from each retrieved entry
    #[serde(default = "default_rag_snippet_chars")]
    pub rag_snippet_chars: usize,

    /// Characters kept from each entry in a compaction prompt
    #[serde(default = "default_compact_preview_chars")]
    pub compact_preview_chars: usize,
}

fn default_rag_limit() -> usize {
    3
}
fn default_rag_snippet_chars() -> usize {
    300
}
fn default_compact_preview_chars() -> usize {
    200
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            history_window: None,
            rag_limit: default_rag_limit(),
            rag_snippet_chars: default_rag_snippet_chars(),
            compact_preview_chars: default_compact_preview_chars(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerConfig {
    /// Graphviz executable used for image output
    #[serde(default = "default_graphviz_binary")]
    pub graphviz_binary: String,

    /// Program that opens a rendered file; unset picks the platform default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener: Option<String>,
}

fn default_graphviz_binary() -> String {
    "dot".into()
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            graphviz_binary: default_graphviz_binary(),
            opener: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.smithers/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `SMITHERS_API_KEY` (highest priority)
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_path())
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.api_key.is_none() {
            self.api_key = lookup("SMITHERS_API_KEY").or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(provider) = lookup("SMITHERS_PROVIDER") {
            self.default_provider = provider;
        }

        if let Some(model) = lookup("SMITHERS_MODEL") {
            self.default_model = model;
        }

        if let Some(url) = lookup("SMITHERS_API_URL") {
            self.api_url = Some(url);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".smithers")
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.assistant.rag_limit == 0 {
            return Err(ConfigError::ValidationError(
                "assistant.rag_limit must be > 0".into(),
            ));
        }

        if self.assistant.history_window == Some(0) {
            return Err(ConfigError::ValidationError(
                "assistant.history_window must be > 0 (omit it to send the full history)".into(),
            ));
        }

        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_model must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            api_url: None,
            default_temperature: default_temperature(),
            default_max_tokens: None,
            request_timeout_secs: default_request_timeout_secs(),
            assistant: AssistantConfig::default(),
            visualizer: VisualizerConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.assistant.rag_limit, 3);
        assert!(config.assistant.history_window.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_provider, config.default_provider);
        assert_eq!(parsed.assistant.rag_snippet_chars, 300);
        assert_eq!(parsed.visualizer.graphviz_binary, "dot");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_history_window_rejected() {
        let mut config = AppConfig::default();
        config.assistant.history_window = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_model, "gpt-4o");
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(
            tmp,
            r#"
default_model = "gpt-4o-mini"

[assistant]
history_window = 10
"#
        )
        .unwrap();

        let config = AppConfig::load_from(tmp.path()).unwrap();
        assert_eq!(config.default_model, "gpt-4o-mini");
        assert_eq!(config.assistant.history_window, Some(10));
        assert_eq!(config.assistant.rag_limit, 3);
        assert_eq!(config.default_provider, "openai");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "default_model = [not toml").unwrap();
        let err = AppConfig::load_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply_in_priority_order() {
        let env: HashMap<&str, &str> = [
            ("SMITHERS_API_KEY", "sk-smithers"),
            ("OPENAI_API_KEY", "sk-openai"),
            ("SMITHERS_MODEL", "gpt-4.1"),
            ("SMITHERS_API_URL", "http://localhost:8080/v1"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("sk-smithers"));
        assert_eq!(config.default_model, "gpt-4.1");
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn file_api_key_wins_over_env() {
        let mut config = AppConfig {
            api_key: Some("sk-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(|k| (k == "OPENAI_API_KEY").then(|| "sk-env".to_string()));
        assert_eq!(config.api_key.as_deref(), Some("sk-file"));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-4o"));
        assert!(toml_str.contains("rag_limit"));
    }
}

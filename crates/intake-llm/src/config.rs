//! Configuration for chat-completions providers

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default chat-completions endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.deepseek.com/v1/chat/completions";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Default sampling temperature; low for stable structured output
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Settings for a chat-completions provider
///
/// The credential is not part of this struct: it comes from the
/// process environment and is never written to config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Full URL of the chat-completions endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with each request
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Whole-request timeout in seconds; unset keeps the HTTP client's default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl LlmConfig {
    /// Request timeout, if configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.endpoint.trim().is_empty() {
            return Err("endpoint must not be empty".to_string());
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(format!("endpoint '{}' is not an http(s) URL", self.endpoint));
        }
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!("temperature {} out of range [0.0, 2.0]", self.temperature));
        }
        if self.timeout_secs == Some(0) {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: None,
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = LlmConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "deepseek-chat");
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_invalid_endpoint() {
        let config = LlmConfig {
            endpoint: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_temperature() {
        let config = LlmConfig {
            temperature: 3.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = LlmConfig {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LlmConfig = toml::from_str("model = \"deepseek-reasoner\"\ntimeout_secs = 90").unwrap();
        assert_eq!(config.model, "deepseek-reasoner");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), Some(Duration::from_secs(90)));
    }
}

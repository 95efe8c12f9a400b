//! Configuration for the ingestion pipeline

use serde::{Deserialize, Serialize};

/// Media types accepted when no configuration overrides them
pub const DEFAULT_MEDIA_TYPES: [&str; 3] = ["text/plain", "text/markdown", "application/json"];

/// Configuration for the ingestion pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum extracted text length (characters)
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,

    /// Media types the text extractor accepts
    #[serde(default = "default_media_types")]
    pub accepted_media_types: Vec<String>,

    /// Speakers on the product team whose lines the model must ignore
    #[serde(default)]
    pub team_speakers: Vec<String>,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_text_length == 0 {
            return Err("max_text_length must be greater than 0".to_string());
        }
        if self.accepted_media_types.is_empty() {
            return Err("accepted_media_types must not be empty".to_string());
        }
        if let Some(bad) = self.accepted_media_types.iter().find(|m| !m.contains('/')) {
            return Err(format!("'{}' is not a media type", bad));
        }
        if self.team_speakers.iter().any(|s| s.trim().is_empty()) {
            return Err("team_speakers must not contain blank names".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_text_length: default_max_text_length(),
            accepted_media_types: default_media_types(),
            team_speakers: Vec::new(),
        }
    }
}

fn default_max_text_length() -> usize {
    200_000
}

fn default_media_types() -> Vec<String> {
    DEFAULT_MEDIA_TYPES.iter().map(|m| m.to_string()).collect()
}

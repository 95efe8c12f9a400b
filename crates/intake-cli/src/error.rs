//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ingestion run failed; the message is the one shown to the user
    #[error("{0}")]
    Ingest(#[from] intake_extractor::PipelineFailure),

    /// Record store error
    #[error("Store error: {0}")]
    Store(#[from] intake_store::StoreError),

    /// Generation service client could not be set up
    #[error("LLM error: {0}")]
    Llm(#[from] intake_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No record with the given ID
    #[error("Record not found: {0}")]
    NotFound(String),
}

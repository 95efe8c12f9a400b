//! Error types for the ingestion pipeline

use intake_domain::TransitionError;
use intake_llm::LlmError;
use thiserror::Error;

/// Message shown when a failure carries no text of its own
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process the file. Please try again.";

/// Errors that can occur while ingesting a document
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractorError {
    /// The document could not be read as text
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The generation service could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// The generation service rejected or never received a credential
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The generation service answered with a failure
    #[error("Service error: {0}")]
    Service(String),

    /// The reply held no usable structured data
    #[error("Parse error: {0}")]
    Parse(String),

    /// A field could not be normalized (reserved: the normalizer currently
    /// falls back to empty strings instead)
    #[error("Normalization error: {0}")]
    Normalization(String),

    /// The record store failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The run state machine refused a transition
    #[error("Invalid stage transition: {0}")]
    Transition(#[from] TransitionError),
}

impl ExtractorError {
    /// Detail text without the category prefix
    pub fn detail(&self) -> String {
        match self {
            ExtractorError::Extraction(s)
            | ExtractorError::Transport(s)
            | ExtractorError::Auth(s)
            | ExtractorError::Service(s)
            | ExtractorError::Parse(s)
            | ExtractorError::Normalization(s)
            | ExtractorError::Persistence(s) => s.clone(),
            ExtractorError::Transition(e) => e.to_string(),
        }
    }

    /// The single message shown to the user for a failed run
    pub fn user_message(&self) -> String {
        if self.detail().trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<LlmError> for ExtractorError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Transport(s) => ExtractorError::Transport(s),
            LlmError::Auth(s) => ExtractorError::Auth(s),
            LlmError::Service { status, message } => {
                ExtractorError::Service(format!("HTTP {}: {}", status, message))
            }
            LlmError::InvalidResponse(s) => ExtractorError::Service(s),
        }
    }
}

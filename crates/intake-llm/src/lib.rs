//! Intake LLM Provider Layer
//!
//! Implementations of the `AnalysisProvider` trait from `intake-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `ChatCompletionsProvider`: OpenAI-compatible chat-completions endpoint
//!   (DeepSeek by default)
//!
//! # Examples
//!
//! ```
//! use intake_llm::MockProvider;
//! use intake_domain::traits::AnalysisProvider;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = MockProvider::new("[]");
//! let result = provider.complete("test prompt").await.unwrap();
//! assert_eq!(result, "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod chat;
pub mod config;

use async_trait::async_trait;
use intake_domain::traits::AnalysisProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use chat::ChatCompletionsProvider;
pub use config::LlmConfig;

/// Errors that can occur while calling a generation service
///
/// None of these are retried by the provider; the caller decides.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Connection failure, timeout, or unreadable response body
    #[error("Transport error: {0}")]
    Transport(String),

    /// Missing or rejected credential
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Non-success status with the service-provided message
    #[error("Service error (HTTP {status}): {message}")]
    Service {
        /// HTTP status code
        status: u16,
        /// Message from the service, or the raw body
        message: String,
    },

    /// Successful status but the body is not a chat-completions reply
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Mock provider for deterministic testing
///
/// Returns pre-configured replies without making any network calls. Clones
/// share call history.
///
/// # Examples
///
/// ```
/// use intake_llm::{LlmError, MockProvider};
/// use intake_domain::traits::AnalysisProvider;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut provider = MockProvider::default();
/// provider.add_response("prompt1", "response1");
/// provider.add_error("prompt2", LlmError::Auth("rejected".into()));
///
/// assert_eq!(provider.complete("prompt1").await.unwrap(), "response1");
/// assert!(provider.complete("prompt2").await.is_err());
/// assert_eq!(provider.call_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_reply: Result<String, LlmError>,
    replies: Arc<Mutex<HashMap<String, Result<String, LlmError>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed reply for all prompts
    pub fn new(reply: impl Into<String>) -> Self {
        Self::with_default(Ok(reply.into()))
    }

    /// Create a MockProvider that fails every call with `error`
    pub fn failing(error: LlmError) -> Self {
        Self::with_default(Err(error))
    }

    fn with_default(default_reply: Result<String, LlmError>) -> Self {
        Self {
            default_reply,
            replies: Arc::new(Mutex::new(HashMap::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a specific reply for a given prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, reply: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .insert(prompt.into(), Ok(reply.into()));
    }

    /// Configure an error for a specific prompt
    pub fn add_error(&mut self, prompt: impl Into<String>, error: LlmError) {
        self.replies.lock().unwrap().insert(prompt.into(), Err(error));
    }

    /// Get the number of times `complete` was called
    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// The most recent prompt received
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        self.prompts.lock().unwrap().clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        let replies = self.replies.lock().unwrap();
        match replies.get(prompt) {
            Some(reply) => reply.clone(),
            None => self.default_reply.clone(),
        }
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

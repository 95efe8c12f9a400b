//! Chat-completions provider
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint. The default
//! configuration targets DeepSeek.
//!
//! Each call is a single request; failures surface immediately and are never
//! retried here.
//!
//! # Examples
//!
//! ```no_run
//! use intake_llm::{ChatCompletionsProvider, LlmConfig};
//! use intake_domain::traits::AnalysisProvider;
//!
//! # async fn example() -> Result<(), intake_llm::LlmError> {
//! let api_key = std::env::var("INTAKE_API_KEY").ok();
//! let provider = ChatCompletionsProvider::new(LlmConfig::default(), api_key)?;
//! let reply = provider.complete("Summarize this transcript").await?;
//! # Ok(())
//! # }
//! ```

use crate::{LlmConfig, LlmError};
use async_trait::async_trait;
use intake_domain::traits::AnalysisProvider;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Provider for OpenAI-compatible chat-completions APIs
pub struct ChatCompletionsProvider {
    config: LlmConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

/// Request body for the chat-completions API
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Response from the chat-completions API; only the first choice is read
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope returned with non-success statuses
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ChatCompletionsProvider {
    /// Create a new provider
    ///
    /// A missing `api_key` is accepted here and reported as
    /// [`LlmError::Auth`] on the first call.
    pub fn new(config: LlmConfig, api_key: Option<String>) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            client,
        })
    }

    /// The configuration this provider was built with
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// True if a credential is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send(&self, prompt: &str) -> Result<String, LlmError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            LlmError::Auth("no API key configured (set INTAKE_API_KEY)".to_string())
        })?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.config.temperature,
        };

        debug!(
            "POST {} (model {}, prompt {} chars)",
            self.config.endpoint,
            self.config.model,
            prompt.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = service_message(&text);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Auth(message),
                _ => LlmError::Service {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        extract_content(&text)
    }
}

/// Pull the service-provided message out of an error body
fn service_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "no message".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Read `choices[0].message.content` from a success body
fn extract_content(body: &str) -> Result<String, LlmError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| LlmError::InvalidResponse("response has no message content".to_string()))
}

#[async_trait]
impl AnalysisProvider for ChatCompletionsProvider {
    type Error = LlmError;

    async fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        self.send(prompt).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider =
            ChatCompletionsProvider::new(LlmConfig::default(), Some("sk-test".into())).unwrap();
        assert!(provider.has_api_key());
        assert_eq!(provider.model_name(), "deepseek-chat");
    }

    #[test]
    fn test_blank_api_key_treated_as_missing() {
        let provider = ChatCompletionsProvider::new(LlmConfig::default(), Some("  ".into())).unwrap();
        assert!(!provider.has_api_key());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_auth_error() {
        let provider = ChatCompletionsProvider::new(LlmConfig::default(), None).unwrap();
        let result = provider.complete("test").await;
        assert!(matches!(result, Err(LlmError::Auth(_))));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatRequest {
            model: "deepseek-chat",
            messages: vec![ChatMessage {
                role: "user",
                content: "hello",
            }],
            temperature: 0.3,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert!((json["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"[{}]"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "[{}]");
    }

    #[test]
    fn test_extract_content_without_choices() {
        assert!(matches!(
            extract_content(r#"{"choices":[]}"#),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(matches!(
            extract_content("<html>"),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_service_message() {
        assert_eq!(
            service_message(r#"{"error":{"message":"Authentication Fails","type":"auth"}}"#),
            "Authentication Fails"
        );
        assert_eq!(service_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(service_message(""), "no message");
    }
}

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use super::types::Message;

/// Errors from an LLM provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Rate limited by provider")]
    RateLimited,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Options for a completion request.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            // Classification tasks want deterministic output
            temperature: 0.0,
            max_tokens: None,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Trait for LLM completion backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name, for logging.
    fn name(&self) -> &str;

    /// Model in use.
    fn model(&self) -> &str;

    /// Run one completion and return the assistant's text.
    async fn complete(
        &self,
        messages: &[Message],
        options: &CompletionOptions,
    ) -> Result<String, LlmError>;
}

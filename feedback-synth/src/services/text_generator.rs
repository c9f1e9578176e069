//! Text-generation collaborator
//!
//! The summary pipeline depends only on [`TextGenerator`]; the production
//! implementation is [`super::anthropic_client::AnthropicClient`]. Errors are
//! surfaced to the caller, never retried here.

use async_trait::async_trait;
use thiserror::Error;

/// Failure talking to the text-generation service
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Generation request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl GenerationError {
    /// Stable short name for logs and API error codes
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "authentication",
            Self::RateLimited { .. } => "rate_limit",
            Self::Timeout => "timeout",
            Self::Transport(_) => "transport",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}

/// One completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Accepts a prompt, returns generated text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

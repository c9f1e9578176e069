//! Anthropic Messages API client
//!
//! Single non-streaming completion per call. HTTP status and transport
//! failures are classified into [`GenerationError`] kinds.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::text_generator::{GenerationError, GenerationRequest, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const USER_AGENT: &str = concat!("feedback-synth/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Debug, Serialize)]
struct MessageParam<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

/// Anthropic API client
pub struct AnthropicClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AnthropicClient {
    /// A missing key is accepted here; every call then fails with
    /// [`GenerationError::Authentication`].
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            GenerationError::Authentication("API key not configured".to_string())
        })?;

        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            messages: vec![MessageParam {
                role: "user",
                content: &request.prompt,
            }],
        };

        tracing::debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            prompt_chars = request.prompt.len(),
            "Sending generation request"
        );

        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();

        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let error_text = response.text().await.unwrap_or_default();
            let message = parse_api_error(&error_text, status);

            tracing::warn!(status = status.as_u16(), message = %message, "Generation API error");

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    GenerationError::Authentication(message)
                }
                StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited {
                    message,
                    retry_after_secs,
                },
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                    GenerationError::Timeout
                }
                _ => GenerationError::Transport(message),
            });
        }

        let text = response.text().await.map_err(classify_transport_error)?;
        let parsed: MessagesResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.block_type == "text")
            .and_then(|block| block.text)
            .ok_or_else(|| {
                GenerationError::MalformedResponse("response contained no text block".to_string())
            })
    }
}

fn classify_transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(err.to_string())
    }
}

/// Extract a readable message from an error body.
///
/// Standard envelope: `{"error": {"type": "...", "message": "..."}}`;
/// anything else falls back to the raw body.
fn parse_api_error(body: &str, status: StatusCode) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(msg) = json["error"]["message"].as_str() {
            return match json["error"]["type"].as_str() {
                Some(kind) => format!("{} ({})", msg, kind),
                None => msg.to_string(),
            };
        }
        if let Some(msg) = json["message"].as_str() {
            return msg.to_string();
        }
    }
    format!("HTTP {}: {}", status.as_u16(), body)
}

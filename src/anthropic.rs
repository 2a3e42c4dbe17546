//! Anthropic generative model backend using the Messages API.
//!
//! This module is only available when the `anthropic` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{RagError, Result};
use crate::model::GenerativeModel;

/// The Anthropic Messages API endpoint.
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// The Messages API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The default generation model.
const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// The default response token budget.
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// A [`GenerativeModel`] backed by the Anthropic Messages API.
///
/// Uses `reqwest` to call the `/v1/messages` endpoint directly with a
/// single user turn and a system instruction.
///
/// # Configuration
///
/// - `model` – defaults to `claude-sonnet-4-20250514`.
/// - `max_tokens` – defaults to 1024.
/// - `api_key` – from the constructor or the `ANTHROPIC_API_KEY`
///   environment variable. A missing credential is a fatal configuration
///   error raised at construction, before any call is attempted.
///
/// # Example
///
/// ```rust,ignore
/// use invoice_rag::anthropic::AnthropicModel;
///
/// let model = AnthropicModel::from_env()?;
/// let answer = model.complete("You are terse.", "Say hi.").await?;
/// ```
pub struct AnthropicModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicModel {
    /// Create a new model client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("Anthropic API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Create a new model client from the `ANTHROPIC_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
            RagError::ConfigError("ANTHROPIC_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the response token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

// ── Messages API request/response types ────────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── GenerativeModel implementation ─────────────────────────────────

#[async_trait]
impl GenerativeModel for AnthropicModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        debug!(
            provider = "Anthropic",
            model = %self.model,
            user_len = user.len(),
            "requesting completion"
        );

        let request_body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: vec![Message { role: "user", content: user }],
        };

        let response = self
            .client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Anthropic", error = %e, "request failed");
                RagError::GenerationError {
                    provider: "Anthropic".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "Anthropic", %status, "API error");
            return Err(RagError::GenerationError {
                provider: "Anthropic".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let messages_response: MessagesResponse = response.json().await.map_err(|e| {
            error!(provider = "Anthropic", error = %e, "failed to parse response");
            RagError::GenerationError {
                provider: "Anthropic".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        messages_response
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .ok_or_else(|| RagError::GenerationError {
                provider: "Anthropic".into(),
                message: "API returned empty content".into(),
            })
    }
}

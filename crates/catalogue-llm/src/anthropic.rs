//! Anthropic Provider Implementation
//!
//! Talks to the Anthropic Messages API. Structured output is obtained by
//! declaring the output schema as a single tool and forcing the model to
//! call it, so the answer arrives as a JSON value rather than prose.
//!
//! # Features
//!
//! - Async HTTP communication via reqwest
//! - Forced tool use for schema-conforming output
//! - Ephemeral prompt caching of the system prefix when requested
//! - Status codes mapped onto `LlmError` classes for retry decisions
//!
//! # Examples
//!
//! ```no_run
//! use catalogue_llm::AnthropicProvider;
//!
//! let provider = AnthropicProvider::new("sk-ant-...", "claude-sonnet-4-5").unwrap();
//! ```

use crate::LlmError;
use async_trait::async_trait;
use catalogue_domain::traits::GenerationService;
use catalogue_domain::{GenerationRequest, GenerationResponse, TokenUsage};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Default Anthropic API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// API version header value
pub const API_VERSION: &str = "2023-06-01";

/// Default model for extraction
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Default timeout for a single request (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Anthropic Messages API provider
#[derive(Clone)]
pub struct AnthropicProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Response body of the messages endpoint
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    ToolUse { name: String, input: Value },
    #[serde(other)]
    Other,
}

/// Error body of the messages endpoint
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

impl AnthropicProvider {
    /// Create a provider against the default endpoint
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Config` if the API key is empty or the HTTP client
    /// cannot be built.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_settings(
            DEFAULT_ENDPOINT,
            api_key,
            model,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create a provider with an explicit endpoint and request timeout
    pub fn with_settings(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::Config("Anthropic API key is not configured".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
            client,
        })
    }

    /// Model requested on every call
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the JSON body for a messages call
    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut system_block = json!({
            "type": "text",
            "text": request.system,
        });
        if request.cache_prefix {
            system_block["cache_control"] = json!({"type": "ephemeral"});
        }

        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "system": [system_block],
            "messages": [
                {"role": "user", "content": request.user_text}
            ],
            "tools": [{
                "name": request.schema_name,
                "description": "Record the information extracted from the text.",
                "input_schema": request.output_schema,
            }],
        });
        if request.force_structured {
            body["tool_choice"] = json!({"type": "tool", "name": request.schema_name});
        }
        body
    }

    /// Turn a successful response body into a `GenerationResponse`
    fn parse_response(body: &str, schema_name: &str) -> Result<GenerationResponse, LlmError> {
        let response: MessagesResponse = serde_json::from_str(body)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        let structured = response.content.into_iter().find_map(|block| match block {
            ContentBlock::ToolUse { name, input } if name == schema_name => Some(input),
            _ => None,
        });

        Ok(GenerationResponse {
            structured,
            usage: response.usage,
            model: response.model,
        })
    }

    /// Extract the human-readable message from an error body
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| "unexpected error response".to_string())
    }

    fn classify_transport(e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(e.to_string())
        } else if e.is_builder() {
            LlmError::Config(e.to_string())
        } else {
            LlmError::Connection(e.to_string())
        }
    }
}

#[async_trait]
impl GenerationService for AnthropicProvider {
    type Error = LlmError;

    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, Self::Error> {
        let url = format!("{}/v1/messages", self.endpoint);
        let body = self.request_body(request);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(Self::classify_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(Self::classify_transport)?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "Anthropic call failed");
            return Err(LlmError::from_status(status.as_u16(), Self::error_message(&text)));
        }

        Self::parse_response(&text, &request.schema_name)
    }
}

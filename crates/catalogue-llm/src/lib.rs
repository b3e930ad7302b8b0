//! Catalogue LLM Provider Layer
//!
//! Implementations of the `GenerationService` trait from `catalogue-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Scripted, call-counting double for tests
//! - `AnthropicProvider`: Anthropic Messages API with forced tool output
//!
//! Providers make exactly one call per `generate`. Retrying is the caller's
//! business; `LlmError::is_transient` tells it which failures are worth it.
//!
//! # Examples
//!
//! ```
//! use catalogue_llm::MockProvider;
//! use serde_json::json;
//!
//! let provider = MockProvider::returning(json!({"model_name": "gpt-4"}));
//! assert_eq!(provider.call_count(), 0);
//! ```

#![warn(missing_docs)]

pub mod anthropic;
pub mod mock;

use catalogue_domain::traits::RemoteFailure;
use thiserror::Error;

pub use anthropic::AnthropicProvider;
pub use mock::{MockCall, MockProvider, MockReply};

/// Errors that can occur during generation calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Too many requests (HTTP 429)
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Remote server error (HTTP 5xx, including overload)
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message reported by the service
        message: String,
    },

    /// Network or connection failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timed out before a response arrived
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Malformed request (HTTP 400 and other client errors)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or rejected credentials (HTTP 401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Unknown endpoint or model (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Provider could not be configured
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => LlmError::RateLimited(message),
            408 => LlmError::Timeout(message),
            401 | 403 => LlmError::Authentication(message),
            404 => LlmError::NotFound(message),
            500..=599 => LlmError::Server { status, message },
            _ => LlmError::BadRequest(message),
        }
    }
}

impl RemoteFailure for LlmError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            LlmError::RateLimited(_)
                | LlmError::Server { .. }
                | LlmError::Connection(_)
                | LlmError::Timeout(_)
        )
    }
}

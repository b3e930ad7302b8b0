//! Request and response shapes for the remote generation service

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One structured-generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System instructions (the stable, cacheable prefix)
    pub system: String,

    /// User message carrying the text to analyze
    pub user_text: String,

    /// JSON schema the response must conform to
    pub output_schema: Value,

    /// Name under which the schema is presented to the service
    pub schema_name: String,

    /// Force the service to answer with the schema instead of free text
    pub force_structured: bool,

    /// Mark the instructions prefix as reusable across calls
    ///
    /// A hint only: results must not depend on whether it is honoured.
    pub cache_prefix: bool,

    /// Upper bound on generated tokens
    pub max_tokens: u32,
}

/// Token accounting reported by the service for one call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenUsage {
    /// Prompt tokens billed at the normal rate
    pub input_tokens: u64,

    /// Generated tokens
    pub output_tokens: u64,

    /// Prompt tokens written to the prefix cache
    pub cache_creation_input_tokens: u64,

    /// Prompt tokens served from the prefix cache
    pub cache_read_input_tokens: u64,
}

impl TokenUsage {
    /// Consumption units for the call: input plus output tokens
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// What the service returned for a structured-generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResponse {
    /// Structured value conforming to the request schema, if any was produced
    pub structured: Option<Value>,

    /// Token accounting
    pub usage: TokenUsage,

    /// Model/version that served the call
    pub model: String,
}

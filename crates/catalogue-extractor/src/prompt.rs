//! Instructions and output schema for model extraction
//!
//! The system prompt is the stable prefix of every call. It never contains
//! per-request data, which is what makes it cacheable by the service.

use catalogue_domain::GenerationRequest;
use serde_json::{json, Value};

/// Name of the output schema as presented to the service
pub const SCHEMA_NAME: &str = "record_model";

/// Builds extraction requests for the generation service
pub struct ExtractionPrompt<'a> {
    text: &'a str,
    cache_prefix: bool,
    max_tokens: u32,
}

impl<'a> ExtractionPrompt<'a> {
    /// Create a prompt for the given text
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            cache_prefix: false,
            max_tokens: 4_096,
        }
    }

    /// Mark the instructions prefix as cacheable
    pub fn with_cache(mut self, cache_prefix: bool) -> Self {
        self.cache_prefix = cache_prefix;
        self
    }

    /// Bound the generated output
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build the complete request
    pub fn build(&self) -> GenerationRequest {
        GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            user_text: format!("Extract model information from this text:\n\n{}", self.text),
            output_schema: output_schema(),
            schema_name: SCHEMA_NAME.to_string(),
            force_structured: true,
            cache_prefix: self.cache_prefix,
            max_tokens: self.max_tokens,
        }
    }
}

/// JSON schema of an extracted record
///
/// Every property is required but nullable, so the service must state
/// absence explicitly instead of omitting keys.
pub fn output_schema() -> Value {
    let nullable_string = |description: &str| json!({"type": ["string", "null"], "description": description});

    json!({
        "type": "object",
        "properties": {
            "model_name": nullable_string(
                "Technical model identifier, lowercase with hyphens (e.g. gpt-4, claude-3-sonnet, llama-2)"
            ),
            "organization": nullable_string("Organization that created the model (e.g. OpenAI, Anthropic, Meta)"),
            "release_date": nullable_string("Release date in ISO format (YYYY-MM-DD)"),
            "description": nullable_string("Brief description of the model's capabilities (1-2 sentences)"),
            "license": nullable_string("License type (e.g. Apache 2.0, MIT, Proprietary, Other)"),
            "metadata": {
                "type": ["object", "null"],
                "description": "Additional details mentioned in the text (context window, pricing, capabilities)",
                "additionalProperties": true
            }
        },
        "required": ["model_name", "organization", "release_date", "description", "license", "metadata"],
        "additionalProperties": false
    })
}

const SYSTEM_PROMPT: &str = r#"You are a data extraction assistant for an AI Model Catalogue database.

Your task is to extract information about AI models from unstructured text sources like:
- Research papers
- Technical blog posts
- News articles
- Benchmark reports

Rules:
- Only extract information explicitly stated in the text
- Use null for missing fields rather than guessing
- Normalize model names to lowercase with hyphens (gpt-4, not GPT4)
- Infer release_date from context clues ("in March 2023" -> "2023-03-01")
- Keep descriptions concise (1-2 sentences)
- Put additional details (context window, pricing, modalities) in metadata as a JSON object

Record the result with the record_model tool. If the text contains no information about an AI model, set every field to null."#;

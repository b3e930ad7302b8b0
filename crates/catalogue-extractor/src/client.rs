//! Extraction client: text in, `ExtractionOutcome` out

use crate::config::ExtractorConfig;
use crate::error::ExtractionError;
use crate::prompt::ExtractionPrompt;
use crate::retry::{RetryError, RetryPolicy};
use catalogue_domain::traits::GenerationService;
use catalogue_domain::{ExtractedRecord, ExtractionOutcome};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Converts unstructured text into an `ExtractionOutcome`
///
/// Construct one per process and clone it into each run; clones share the
/// underlying service.
pub struct ExtractionClient<G> {
    service: Arc<G>,
    config: ExtractorConfig,
    retry: RetryPolicy,
}

impl<G> Clone for ExtractionClient<G> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: self.config.clone(),
            retry: self.retry,
        }
    }
}

impl<G: GenerationService> ExtractionClient<G> {
    /// Create a new client owning `service`
    pub fn new(service: G, config: ExtractorConfig) -> Self {
        Self::from_shared(Arc::new(service), config)
    }

    /// Create a client around an already shared service
    pub fn from_shared(service: Arc<G>, config: ExtractorConfig) -> Self {
        let retry = RetryPolicy::from_config(&config);
        Self {
            service,
            config,
            retry,
        }
    }

    /// The configuration in effect
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract with the configured cache default
    pub async fn extract_default(&self, text: &str) -> Result<ExtractionOutcome, ExtractionError> {
        self.extract(text, self.config.use_cache).await
    }

    /// Extract model information from `text`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the text is blank or too long; no call is made
    /// - `TransientCallFailure` when transient failures outlast the retries
    /// - `NonRetryableCallFailure` on the first non-transient failure, or
    ///   when the structured value does not match the record schema
    pub async fn extract(&self, text: &str, use_cache: bool) -> Result<ExtractionOutcome, ExtractionError> {
        if text.trim().is_empty() {
            return Err(ExtractionError::InvalidInput(
                "Input text for extraction cannot be empty".to_string(),
            ));
        }
        let length = text.chars().count();
        if length > self.config.max_text_length {
            return Err(ExtractionError::InvalidInput(format!(
                "Text too long: {} chars (max: {})",
                length, self.config.max_text_length
            )));
        }

        info!(text_length = length, use_cache, "Starting extraction");

        let request = ExtractionPrompt::new(text)
            .with_cache(use_cache)
            .with_max_tokens(self.config.max_tokens)
            .build();

        let response = self
            .retry
            .run("generate", || self.service.generate(&request))
            .await
            .map_err(|e| match e {
                RetryError::Exhausted { attempts, last } => ExtractionError::TransientCallFailure {
                    attempts,
                    message: last.to_string(),
                },
                RetryError::Fatal(e) => ExtractionError::NonRetryableCallFailure(e.to_string()),
            })?;

        let record = Self::decode(response.structured)?;

        info!(
            consumption_units = response.usage.total(),
            model = %response.model,
            found = record.is_some(),
            "Extraction complete"
        );
        if use_cache {
            info!(
                cached = response.usage.cache_read_input_tokens,
                cache_creation = response.usage.cache_creation_input_tokens,
                "Prompt cache usage"
            );
        }

        Ok(ExtractionOutcome::new(record, response.usage, response.model))
    }

    /// Turn the structured value into a record, `None` when nothing was found
    ///
    /// Blank fields come back as `None`.
    fn decode(structured: Option<Value>) -> Result<Option<ExtractedRecord>, ExtractionError> {
        let value = match structured {
            None | Some(Value::Null) => {
                debug!("Service returned no structured value");
                return Ok(None);
            }
            Some(value) => value,
        };

        let record = serde_json::from_value::<ExtractedRecord>(value).map_err(|e| {
            ExtractionError::NonRetryableCallFailure(format!(
                "Structured output does not match the record schema: {}",
                e
            ))
        })?
        .normalized();

        Ok((!record.is_empty()).then_some(record))
    }
}

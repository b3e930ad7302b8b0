//! Catalogue Extractor
//!
//! Converts unstructured text into an `ExtractionOutcome` using a remote
//! generation service with structured output.
//!
//! # Architecture
//!
//! ```text
//! Text → ExtractionClient → GenerationService → ExtractionOutcome → Gatekeeper → ModelStore
//! ```
//!
//! # Key Features
//!
//! - **Input check**: blank or oversized text fails before any call is made
//! - **Structured output**: the service is forced to answer with the record
//!   schema; free text is never parsed
//! - **Retry**: transient failures back off exponentially, everything else
//!   fails on the first attempt
//! - **Prompt caching**: the instructions prefix can be marked cacheable
//!
//! # Example Usage
//!
//! ```no_run
//! use catalogue_extractor::{ExtractionClient, ExtractorConfig};
//! use catalogue_llm::MockProvider;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = MockProvider::returning(json!({"model_name": "gpt-4"}));
//! let client = ExtractionClient::new(provider, ExtractorConfig::default());
//!
//! let outcome = client.extract("GPT-4 was released by OpenAI in March 2023.", true).await?;
//! println!("Consumption: {} units", outcome.consumption_units);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod error;
mod prompt;
mod retry;

#[cfg(test)]
mod tests;

pub use client::ExtractionClient;
pub use config::ExtractorConfig;
pub use error::ExtractionError;
pub use prompt::{output_schema, ExtractionPrompt, SCHEMA_NAME};
pub use retry::{RetryError, RetryPolicy};

//! Catalogue Gatekeeper
//!
//! Validates extraction outcomes and converts them into canonical records.
//!
//! The Gatekeeper provides:
//! - Presence checks (a record exists, the name is present)
//! - Name normalization into the natural key
//! - Release date parsing
//! - Policy checks (required fields, field lengths)
//!
//! It performs no I/O.
//!
//! # Examples
//!
//! ```
//! use catalogue_domain::{ExtractedRecord, ExtractionOutcome, TokenUsage};
//! use catalogue_gatekeeper::{Gatekeeper, ValidationConfig};
//!
//! let gatekeeper = Gatekeeper::new(ValidationConfig::default());
//! let record = ExtractedRecord {
//!     model_name: Some("GPT 4".to_string()),
//!     ..Default::default()
//! };
//! let outcome = ExtractionOutcome::new(Some(record), TokenUsage::default(), "mock-model");
//!
//! let canonical = gatekeeper.validate(outcome).unwrap();
//! assert_eq!(canonical.name, "gpt-4");
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ValidationConfig;
pub use error::ValidationError;
pub use validator::{normalize_name, parse_release_date, Gatekeeper};

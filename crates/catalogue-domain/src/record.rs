//! Records flowing through the extraction pipeline
//!
//! A record changes vocabulary twice on its way to storage:
//!
//! ```text
//! ExtractedRecord (model_name, ...) → CanonicalRecord (name, ...) → ModelEntry (id, name, ...)
//! ```
//!
//! The extraction vocabulary follows the output schema handed to the
//! generation service; the storage vocabulary follows the catalogue table.
//! The two are kept apart so either side can evolve on its own.

use crate::generation::TokenUsage;
use crate::id::ModelId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw output of a single extraction attempt
///
/// Every field is optional because extraction is inherently partial. Missing
/// keys in the structured value deserialize to `None`, unknown keys are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractedRecord {
    /// Technical model identifier (e.g. "gpt-4")
    pub model_name: Option<String>,

    /// Organization that created the model
    pub organization: Option<String>,

    /// Release date as emitted by the generator (ISO `YYYY-MM-DD` expected)
    pub release_date: Option<String>,

    /// Brief description of the model's capabilities
    pub description: Option<String>,

    /// License string ("Apache 2.0", "Proprietary", ...)
    pub license: Option<String>,

    /// Additional details (context window, pricing, ...)
    pub metadata: Option<Map<String, Value>>,
}

impl ExtractedRecord {
    /// True when no field carries any information
    ///
    /// Blank strings and empty metadata objects count as absent. An all-empty
    /// structured value is how the generator reports "nothing found".
    pub fn is_empty(&self) -> bool {
        let blank = |field: &Option<String>| field.as_deref().map_or(true, |s| s.trim().is_empty());

        blank(&self.model_name)
            && blank(&self.organization)
            && blank(&self.release_date)
            && blank(&self.description)
            && blank(&self.license)
            && self.metadata.as_ref().map_or(true, |m| m.is_empty())
    }

    /// Replace blank strings and empty metadata with `None`
    pub fn normalized(self) -> Self {
        fn present(field: Option<String>) -> Option<String> {
            field.filter(|s| !s.trim().is_empty())
        }

        Self {
            model_name: present(self.model_name),
            organization: present(self.organization),
            release_date: present(self.release_date),
            description: present(self.description),
            license: present(self.license),
            metadata: self.metadata.filter(|m| !m.is_empty()),
        }
    }
}

/// Result of one extraction call plus its accounting metadata
///
/// The outcome is handed to the validator by value, so it is consumed
/// exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    /// Extracted record, `None` when the generator found nothing
    pub record: Option<ExtractedRecord>,

    /// Total consumption units (input + output tokens) billed for the call
    pub consumption_units: u64,

    /// Identifier of the model/version that produced the outcome
    pub model_used: String,

    /// Detailed token accounting, including prompt cache activity
    pub usage: TokenUsage,
}

impl ExtractionOutcome {
    /// Build an outcome from a record and the usage reported by the service
    pub fn new(record: Option<ExtractedRecord>, usage: TokenUsage, model_used: impl Into<String>) -> Self {
        Self {
            record,
            consumption_units: usage.total(),
            model_used: model_used.into(),
            usage,
        }
    }
}

/// Validated, storage-ready form of an extracted record
///
/// Only the gatekeeper builds these. `name` is the normalized natural key and
/// is never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Normalized natural key (lowercase, hyphenated)
    pub name: String,

    /// Human-facing spelling of the name
    pub display_name: String,

    /// Organization that created the model
    pub organization: Option<String>,

    /// Release date
    pub release_date: Option<NaiveDate>,

    /// Brief description
    pub description: Option<String>,

    /// License string
    pub license: Option<String>,

    /// Additional details
    pub metadata: Option<Map<String, Value>>,
}

/// A catalogue entry as persisted by the storage layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Storage-generated surrogate key
    pub id: ModelId,

    /// Natural key, unique across the catalogue
    pub name: String,

    /// Human-facing spelling of the name
    pub display_name: String,

    /// Organization that created the model
    pub organization: Option<String>,

    /// Release date
    pub release_date: Option<NaiveDate>,

    /// Brief description
    pub description: Option<String>,

    /// License string
    pub license: Option<String>,

    /// Additional details
    pub metadata: Option<Map<String, Value>>,

    /// When the entry was inserted
    pub created_at: DateTime<Utc>,
}

impl ModelEntry {
    /// Materialize a stored entry from a canonical record
    pub fn from_record(id: ModelId, record: CanonicalRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: record.name,
            display_name: record.display_name,
            organization: record.organization,
            release_date: record.release_date,
            description: record.description,
            license: record.license,
            metadata: record.metadata,
            created_at,
        }
    }
}

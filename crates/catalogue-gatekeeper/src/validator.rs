//! Outcome validation and conversion to the storage vocabulary

use crate::{ValidationConfig, ValidationError};
use catalogue_domain::{CanonicalRecord, ExtractedRecord, ExtractionOutcome};
use chrono::NaiveDate;
use tracing::debug;

/// The Gatekeeper validates extraction outcomes before storage
#[derive(Debug, Clone, Default)]
pub struct Gatekeeper {
    config: ValidationConfig,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a Gatekeeper with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// The policy in effect
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate an outcome and convert it into a canonical record
    ///
    /// Consumes the outcome. Absent fields stay absent; blank strings are
    /// treated as absent.
    ///
    /// # Errors
    ///
    /// - `NoDataExtracted` when the outcome carries no record
    /// - `MissingField` when the name, or a field the policy requires, is absent
    /// - `InvalidDate` when the release date is not a calendar date
    /// - `FieldTooLong` when a short text field exceeds the storage limit
    pub fn validate(&self, outcome: ExtractionOutcome) -> Result<CanonicalRecord, ValidationError> {
        let ExtractedRecord {
            model_name,
            organization,
            release_date,
            description,
            license,
            metadata,
        } = outcome.record.ok_or(ValidationError::NoDataExtracted)?;

        let display_name = clean(model_name).ok_or(ValidationError::MissingField("model_name"))?;
        let name = normalize_name(&display_name);
        if name.is_empty() {
            return Err(ValidationError::MissingField("model_name"));
        }

        let organization = clean(organization);
        if self.config.require_organization && organization.is_none() {
            return Err(ValidationError::MissingField("organization"));
        }

        let description = clean(description);
        if self.config.require_description && description.is_none() {
            return Err(ValidationError::MissingField("description"));
        }

        let release_date = clean(release_date)
            .map(|raw| parse_release_date(&raw))
            .transpose()?;

        let record = CanonicalRecord {
            name,
            display_name,
            organization,
            release_date,
            description,
            license: clean(license),
            metadata: metadata.filter(|m| !m.is_empty()),
        };

        if self.config.validate_field_lengths {
            self.check_lengths(&record)?;
        }

        debug!(
            name = %record.name,
            organization = ?record.organization,
            release_date = ?record.release_date,
            "Outcome accepted"
        );

        Ok(record)
    }

    fn check_lengths(&self, record: &CanonicalRecord) -> Result<(), ValidationError> {
        let max = self.config.max_field_length;
        let fields = [
            ("name", Some(&record.name)),
            ("display_name", Some(&record.display_name)),
            ("organization", record.organization.as_ref()),
            ("license", record.license.as_ref()),
        ];

        for (field, value) in fields {
            if let Some(value) = value {
                let length = value.chars().count();
                if length > max {
                    return Err(ValidationError::FieldTooLong { field, length, max });
                }
            }
        }
        Ok(())
    }
}

/// Trim a field, mapping blank strings to `None`
fn clean(field: Option<String>) -> Option<String> {
    field
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Normalize a model name into its natural key
///
/// Lowercases, turns whitespace and underscores into hyphens, collapses
/// runs of hyphens and strips them from both ends.
///
/// ```
/// use catalogue_gatekeeper::normalize_name;
///
/// assert_eq!(normalize_name("  GPT 4 "), "gpt-4");
/// assert_eq!(normalize_name("Claude_3__Sonnet"), "claude-3-sonnet");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let mut name = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        let c = if c.is_whitespace() || c == '_' { '-' } else { c };
        if c == '-' && (name.is_empty() || name.ends_with('-')) {
            continue;
        }
        name.push(c);
    }
    while name.ends_with('-') {
        name.pop();
    }
    name
}

/// Parse a release date in `YYYY-MM-DD` or `YYYY-MM` form
///
/// A month-only date resolves to the first of the month.
pub fn parse_release_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d"))
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

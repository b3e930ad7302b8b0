//! Gatekeeper error types

use thiserror::Error;

/// Reasons an extraction outcome cannot become a canonical record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The outcome carries no record at all
    #[error("No model information could be extracted from the provided text")]
    NoDataExtracted,

    /// A field required by the policy is absent
    #[error("Required field '{0}' is missing")]
    MissingField(&'static str),

    /// The release date is not a calendar date
    #[error("Invalid release date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// A field exceeds the storage limit
    #[error("Field '{field}' is {length} characters long (max: {max})")]
    FieldTooLong {
        /// Field name in the storage vocabulary
        field: &'static str,
        /// Actual length
        length: usize,
        /// Allowed length
        max: usize,
    },
}

//! Error types for the extraction client

use thiserror::Error;

/// Errors that can occur during extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// Empty or oversized input; no call was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Transient failures persisted past the retry bound
    #[error("Generation call failed after {attempts} attempts: {message}")]
    TransientCallFailure {
        /// Number of calls made
        attempts: u32,
        /// Last error reported by the service
        message: String,
    },

    /// The call failed in a way retrying cannot fix
    #[error("Generation call failed: {0}")]
    NonRetryableCallFailure(String),
}

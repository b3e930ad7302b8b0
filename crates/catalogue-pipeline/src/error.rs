//! Top-level error taxonomy of a pipeline run

use crate::writer::{existing_suffix, WriteError};
use catalogue_domain::{ErrorKind, ModelId};
use catalogue_extractor::ExtractionError;
use catalogue_gatekeeper::ValidationError;
use std::time::Duration;
use thiserror::Error;

/// Why a pipeline run failed
///
/// Every variant maps to exactly one `ErrorKind`; the HTTP status for a kind
/// comes from `ErrorKind::status_code`. Messages name the key or attempt
/// count involved and never include raw provider bodies.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Empty or oversized input; nothing was called
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The text contained no model information
    #[error("No model information could be extracted from the provided text")]
    NoDataExtracted,

    /// Transient failures persisted past the retry bound
    #[error("Generation call failed after {attempts} attempts: {message}")]
    TransientCallFailure {
        /// Number of calls made
        attempts: u32,
        /// Last error reported by the service
        message: String,
    },

    /// The generation call failed in a way retrying cannot fix
    #[error("Generation call failed: {0}")]
    NonRetryableCallFailure(String),

    /// The natural key is already stored
    #[error("Model '{name}' already exists{}", existing_suffix(.existing_id))]
    DuplicateKey {
        /// The natural key
        name: String,
        /// Identifier of the existing entry, when it could be resolved
        existing_id: Option<ModelId>,
    },

    /// The store failed
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// The record failed a validation rule
    #[error("Record rejected: {0}")]
    Rejected(ValidationError),

    /// The run-level deadline expired
    #[error("Run did not finish within {0:?}")]
    TimedOut(Duration),
}

impl PipelineError {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::NoDataExtracted => ErrorKind::NoDataExtracted,
            PipelineError::TransientCallFailure { .. } => ErrorKind::TransientCallFailure,
            PipelineError::NonRetryableCallFailure(_) => ErrorKind::NonRetryableCallFailure,
            PipelineError::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            PipelineError::StorageFailure(_) => ErrorKind::StorageFailure,
            PipelineError::Rejected(_) => ErrorKind::Rejected,
            PipelineError::TimedOut(_) => ErrorKind::TimedOut,
        }
    }

    /// HTTP status an outer boundary should answer with
    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

impl From<ExtractionError> for PipelineError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::InvalidInput(msg) => PipelineError::InvalidInput(msg),
            ExtractionError::TransientCallFailure { attempts, message } => {
                PipelineError::TransientCallFailure { attempts, message }
            }
            ExtractionError::NonRetryableCallFailure(msg) => {
                PipelineError::NonRetryableCallFailure(msg)
            }
        }
    }
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::NoDataExtracted => PipelineError::NoDataExtracted,
            other => PipelineError::Rejected(other),
        }
    }
}

impl From<WriteError> for PipelineError {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::DuplicateKey { name, existing_id } => {
                PipelineError::DuplicateKey { name, existing_id }
            }
            WriteError::Storage(msg) => PipelineError::StorageFailure(msg),
        }
    }
}

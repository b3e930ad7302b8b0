//! Catalogue Domain Layer
//!
//! Core data model and trait seams for the model catalogue extraction
//! pipeline. Everything else in the workspace depends on this crate; it
//! depends on no other workspace crate.
//!
//! ## Key Concepts
//!
//! - **ExtractedRecord**: partial, untrusted output of one extraction call
//! - **ExtractionOutcome**: a record (or its absence) plus consumption units
//! - **CanonicalRecord**: validated, normalized, ready for storage
//! - **ModelEntry**: the stored form, keyed by a unique natural key
//! - **RunState**: lifecycle of one pipeline run
//!
//! ## Architecture
//!
//! - Pure data and state logic only, no I/O
//! - Trait definitions for every external interaction
//!   (`GenerationService`, `ModelStore`)
//! - Infrastructure implementations live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod generation;
pub mod id;
pub mod record;
pub mod run;
pub mod traits;

// Re-exports for convenience
pub use generation::{GenerationRequest, GenerationResponse, TokenUsage};
pub use id::ModelId;
pub use record::{CanonicalRecord, ExtractedRecord, ExtractionOutcome, ModelEntry};
pub use run::{ErrorKind, RunState, RunTracker, TransitionError};

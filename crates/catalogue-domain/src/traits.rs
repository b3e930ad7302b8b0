//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! collaborators. Implementations live in other crates (catalogue-llm,
//! catalogue-store) and test doubles substitute for them freely.

use crate::generation::{GenerationRequest, GenerationResponse};
use crate::record::{CanonicalRecord, ModelEntry};
use async_trait::async_trait;

/// Failure of a remote generation call, classified for retry decisions
pub trait RemoteFailure: std::error::Error + Send + Sync + 'static {
    /// True for failures expected to resolve on retry (rate limiting,
    /// server errors, connection problems)
    fn is_transient(&self) -> bool;
}

/// Failure of a storage operation
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
    /// True when the store rejected a write because the natural key is taken
    fn is_conflict(&self) -> bool;
}

/// Remote text-generation service with structured output
///
/// Implemented by the infrastructure layer (catalogue-llm)
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Error type for generation calls
    type Error: RemoteFailure;

    /// Issue exactly one generation call
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, Self::Error>;
}

/// Catalogue storage keyed by natural key
///
/// Implemented by the infrastructure layer (catalogue-store). Implementations
/// must enforce uniqueness of `name` themselves; callers check first, the
/// store is the final arbiter when two writers race.
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Error type for store operations
    type Error: StoreFailure;

    /// Look up an entry by its natural key
    async fn find_by_name(&self, name: &str) -> Result<Option<ModelEntry>, Self::Error>;

    /// Insert a new entry, assigning its identifier and creation time
    async fn insert(&self, record: CanonicalRecord) -> Result<ModelEntry, Self::Error>;
}

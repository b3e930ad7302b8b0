//! Duplicate-checked writes
//!
//! The lookup always precedes the insert within one run. Across runs the
//! store's own uniqueness constraint decides, and a lost race is reported
//! the same way as a lookup hit.

use catalogue_domain::traits::{ModelStore, StoreFailure};
use catalogue_domain::{CanonicalRecord, ModelEntry, ModelId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the duplicate-checked writer
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WriteError {
    /// An entry with this natural key already exists
    #[error("Model '{name}' already exists{}", existing_suffix(.existing_id))]
    DuplicateKey {
        /// The natural key
        name: String,
        /// Identifier of the existing entry, when it could be resolved
        existing_id: Option<ModelId>,
    },

    /// The store failed for any other reason
    #[error("Storage failure: {0}")]
    Storage(String),
}

pub(crate) fn existing_suffix(existing_id: &Option<ModelId>) -> String {
    existing_id
        .map(|id| format!(" with ID {}", id))
        .unwrap_or_default()
}

/// Inserts canonical records unless their natural key is already taken
pub struct DuplicateCheckedWriter<S> {
    store: Arc<S>,
}

impl<S> Clone for DuplicateCheckedWriter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ModelStore> DuplicateCheckedWriter<S> {
    /// Create a writer over `store`
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    /// Create a writer over a store that is shared elsewhere
    pub fn from_shared(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fail with `DuplicateKey` if the record's key is already stored
    pub async fn find_conflict(&self, record: &CanonicalRecord) -> Result<(), WriteError> {
        let existing = self
            .store
            .find_by_name(&record.name)
            .await
            .map_err(|e| WriteError::Storage(e.to_string()))?;

        match existing {
            Some(entry) => {
                debug!(name = %record.name, existing_id = %entry.id, "Natural key already stored");
                Err(WriteError::DuplicateKey {
                    name: record.name.clone(),
                    existing_id: Some(entry.id),
                })
            }
            None => Ok(()),
        }
    }

    /// Insert the record, mapping a store-level key conflict to `DuplicateKey`
    pub async fn insert_checked(&self, record: CanonicalRecord) -> Result<ModelEntry, WriteError> {
        let name = record.name.clone();

        match self.store.insert(record).await {
            Ok(entry) => {
                info!(id = %entry.id, name = %entry.name, "Model stored");
                Ok(entry)
            }
            Err(e) if e.is_conflict() => {
                warn!(name = %name, "Lost insert race to a concurrent writer");
                let existing_id = match self.store.find_by_name(&name).await {
                    Ok(found) => found.map(|entry| entry.id),
                    Err(e) => {
                        warn!(name = %name, error = %e, "Could not resolve the existing entry");
                        None
                    }
                };
                Err(WriteError::DuplicateKey { name, existing_id })
            }
            Err(e) => Err(WriteError::Storage(e.to_string())),
        }
    }

    /// Check for a duplicate, then insert
    pub async fn create_if_absent(&self, record: CanonicalRecord) -> Result<ModelEntry, WriteError> {
        self.find_conflict(&record).await?;
        self.insert_checked(record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use catalogue_store::{MemoryStore, StoreError};

    fn record(name: &str) -> CanonicalRecord {
        CanonicalRecord {
            name: name.to_string(),
            display_name: name.to_string(),
            organization: None,
            release_date: None,
            description: None,
            license: None,
            metadata: None,
        }
    }

    /// Store whose lookups never see anything, as if another run inserted
    /// between the check and the write
    struct BlindStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl ModelStore for BlindStore {
        type Error = StoreError;

        async fn find_by_name(&self, _name: &str) -> Result<Option<ModelEntry>, StoreError> {
            Ok(None)
        }

        async fn insert(&self, record: CanonicalRecord) -> Result<ModelEntry, StoreError> {
            self.inner.insert(record).await
        }
    }

    /// Store that fails every operation
    struct BrokenStore;

    #[async_trait]
    impl ModelStore for BrokenStore {
        type Error = StoreError;

        async fn find_by_name(&self, _name: &str) -> Result<Option<ModelEntry>, StoreError> {
            Err(StoreError::InvalidData("disk on fire".into()))
        }

        async fn insert(&self, _record: CanonicalRecord) -> Result<ModelEntry, StoreError> {
            Err(StoreError::InvalidData("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn test_create_if_absent_then_duplicate() {
        let writer = DuplicateCheckedWriter::new(MemoryStore::new());

        let first = writer.create_if_absent(record("gpt-4")).await.unwrap();
        let err = writer.create_if_absent(record("gpt-4")).await.unwrap_err();

        assert_eq!(
            err,
            WriteError::DuplicateKey {
                name: "gpt-4".into(),
                existing_id: Some(first.id)
            }
        );
        // the second run never reached the insert
        assert_eq!(writer.store().insert_attempts(), 1);
        assert_eq!(writer.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_store_conflict_becomes_duplicate_key() {
        let inner = MemoryStore::new();
        let winner = inner.insert(record("gpt-4")).await.unwrap();
        let writer = DuplicateCheckedWriter::new(BlindStore { inner });

        let err = writer.create_if_absent(record("gpt-4")).await.unwrap_err();

        // the re-lookup is blind too, so the id stays unresolved
        assert_eq!(
            err,
            WriteError::DuplicateKey {
                name: "gpt-4".into(),
                existing_id: None
            }
        );
        assert_eq!(writer.store().inner.len().await, 1);
        assert_eq!(writer.store().inner.entries().await[0].id, winner.id);
    }

    #[tokio::test]
    async fn test_insert_checked_resolves_winner_id() {
        let store = MemoryStore::new();
        let winner = store.insert(record("gpt-4")).await.unwrap();
        let writer = DuplicateCheckedWriter::new(store);

        let err = writer.insert_checked(record("gpt-4")).await.unwrap_err();
        assert_eq!(
            err,
            WriteError::DuplicateKey {
                name: "gpt-4".into(),
                existing_id: Some(winner.id)
            }
        );
        assert_eq!(
            err.to_string(),
            format!("Model 'gpt-4' already exists with ID {}", winner.id)
        );
    }

    #[tokio::test]
    async fn test_other_store_errors_are_storage_failures() {
        let writer = DuplicateCheckedWriter::new(BrokenStore);

        let err = writer.create_if_absent(record("gpt-4")).await.unwrap_err();
        assert!(matches!(err, WriteError::Storage(ref msg) if msg.contains("disk on fire")));

        let err = writer.insert_checked(record("gpt-4")).await.unwrap_err();
        assert!(matches!(err, WriteError::Storage(_)));
    }
}

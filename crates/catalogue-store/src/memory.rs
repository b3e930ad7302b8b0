//! In-process model store

use crate::StoreError;
use async_trait::async_trait;
use catalogue_domain::traits::ModelStore;
use catalogue_domain::{CanonicalRecord, ModelEntry, ModelId};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Map-backed store with the same uniqueness contract as `SqliteStore`
///
/// Clones share the same entries. Insert attempts are counted, including
/// rejected ones, so tests can assert that no write was tried.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, ModelEntry>>>,
    insert_attempts: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing is stored
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Number of `insert` calls, successful or not
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    /// Snapshot of every stored entry, oldest first
    pub async fn entries(&self) -> Vec<ModelEntry> {
        let mut entries: Vec<_> = self.entries.read().await.values().cloned().collect();
        entries.sort_by_key(|e| e.id);
        entries
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    type Error = StoreError;

    async fn find_by_name(&self, name: &str) -> Result<Option<ModelEntry>, Self::Error> {
        Ok(self.entries.read().await.get(name).cloned())
    }

    async fn insert(&self, record: CanonicalRecord) -> Result<ModelEntry, Self::Error> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);

        let mut entries = self.entries.write().await;
        if entries.contains_key(&record.name) {
            return Err(StoreError::Conflict { name: record.name });
        }

        let entry = ModelEntry::from_record(ModelId::new(), record, Utc::now());
        entries.insert(entry.name.clone(), entry.clone());
        Ok(entry)
    }
}

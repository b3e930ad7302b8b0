//! Catalogue Storage Layer
//!
//! Implements the `ModelStore` trait twice:
//!
//! - `SqliteStore`: SQLite with a UNIQUE constraint on the natural key
//! - `MemoryStore`: in-process map with the same uniqueness contract
//!
//! Both treat the natural key as the final arbiter: an insert for a name that
//! already exists fails with `StoreError::Conflict`, whatever the caller
//! checked beforehand.
//!
//! # Examples
//!
//! ```no_run
//! use catalogue_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for catalogue operations
//! ```

#![warn(missing_docs)]

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use catalogue_domain::traits::StoreFailure;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An entry with this natural key already exists
    #[error("Model '{name}' already exists")]
    Conflict {
        /// The natural key that is taken
        name: String,
    },

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The blocking database task did not complete
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreFailure for StoreError {
    fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

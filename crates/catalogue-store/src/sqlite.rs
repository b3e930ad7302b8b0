//! SQLite-backed model store

use crate::StoreError;
use async_trait::async_trait;
use catalogue_domain::traits::ModelStore;
use catalogue_domain::{CanonicalRecord, ModelEntry, ModelId};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

const SELECT_COLUMNS: &str = "SELECT id, name, display_name, organization, release_date, description, license, metadata, created_at
     FROM models";

/// SQLite-based implementation of ModelStore
///
/// The natural key is enforced by a UNIQUE constraint on `name`, so two
/// concurrent inserts for the same key can never both succeed.
///
/// # Thread Safety
///
/// The connection sits behind a mutex and every statement runs on the
/// blocking thread pool. Clones share the same connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use catalogue_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("catalogue.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create a store backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Run `f` against the connection on the blocking pool
    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&guard)
        })
        .await?
    }

    /// Fetch an entry by identifier
    pub async fn get(&self, id: ModelId) -> Result<Option<ModelEntry>, StoreError> {
        self.with_conn(move |conn| {
            let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
            let entry = conn
                .query_row(&sql, params![model_id_to_bytes(id)], read_entry)
                .optional()?;
            Ok(entry)
        })
        .await
    }

    /// List entries oldest first
    pub async fn list(&self, offset: usize, limit: usize) -> Result<Vec<ModelEntry>, StoreError> {
        self.with_conn(move |conn| {
            let sql = format!("{} ORDER BY created_at, id LIMIT ?1 OFFSET ?2", SELECT_COLUMNS);
            let mut stmt = conn.prepare(&sql)?;
            let entries = stmt
                .query_map(params![limit as i64, offset as i64], read_entry)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(entries)
        })
        .await
    }

    /// Number of stored entries
    pub async fn count(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM models", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

#[async_trait]
impl ModelStore for SqliteStore {
    type Error = StoreError;

    async fn find_by_name(&self, name: &str) -> Result<Option<ModelEntry>, Self::Error> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            let sql = format!("{} WHERE name = ?1", SELECT_COLUMNS);
            let entry = conn.query_row(&sql, params![name], read_entry).optional()?;
            Ok(entry)
        })
        .await
    }

    async fn insert(&self, record: CanonicalRecord) -> Result<ModelEntry, Self::Error> {
        let entry = ModelEntry::from_record(ModelId::new(), record, Utc::now());

        self.with_conn(move |conn| {
            let metadata = entry
                .metadata
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| StoreError::InvalidData(format!("Unserializable metadata: {}", e)))?;

            let result = conn.execute(
                "INSERT INTO models (id, name, display_name, organization, release_date, description, license, metadata, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    model_id_to_bytes(entry.id),
                    &entry.name,
                    &entry.display_name,
                    &entry.organization,
                    entry.release_date,
                    &entry.description,
                    &entry.license,
                    metadata,
                    entry.created_at,
                ],
            );

            match result {
                Ok(_) => {
                    debug!(id = %entry.id, name = %entry.name, "Inserted model");
                    Ok(entry)
                }
                Err(e) if is_unique_violation(&e) => {
                    debug!(name = %entry.name, "Insert rejected by unique constraint");
                    Err(StoreError::Conflict { name: entry.name })
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Convert ModelId to bytes for storage
fn model_id_to_bytes(id: ModelId) -> Vec<u8> {
    id.value().to_be_bytes().to_vec()
}

/// Convert bytes to ModelId
fn bytes_to_model_id(bytes: &[u8]) -> Result<ModelId, StoreError> {
    let arr: [u8; 16] = bytes.try_into().map_err(|_| {
        StoreError::InvalidData(format!("Expected 16 bytes for ModelId, got {}", bytes.len()))
    })?;
    Ok(ModelId::from_value(u128::from_be_bytes(arr)))
}

fn read_entry(row: &Row<'_>) -> rusqlite::Result<ModelEntry> {
    let id_bytes: Vec<u8> = row.get(0)?;
    let id = bytes_to_model_id(&id_bytes)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Blob, Box::new(e)))?;

    let metadata: Option<String> = row.get(7)?;
    let metadata = metadata
        .map(|text| serde_json::from_str(&text))
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, Type::Text, Box::new(e)))?;

    Ok(ModelEntry {
        id,
        name: row.get(1)?,
        display_name: row.get(2)?,
        organization: row.get(3)?,
        release_date: row.get(4)?,
        description: row.get(5)?,
        license: row.get(6)?,
        metadata,
        created_at: row.get(8)?,
    })
}

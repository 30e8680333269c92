//! Document store contract shared by the HTTP handlers.
//!
//! The store is append-only from this service's point of view: records are
//! created by `put` and looked up by `get`, never updated or deleted.

use crate::object_id::ObjectId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Key absent, or not a syntactically valid id
    #[error("no data found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `value` under a freshly generated id and return the id
    async fn put(&self, value: &str) -> Result<ObjectId, StoreError>;

    /// Look up the value stored under `key`
    ///
    /// Keys that are not 24 hex characters fail with `StoreError::NotFound`
    /// without reaching the backend.
    async fn get(&self, key: &str) -> Result<String, StoreError>;
}

/// Parse a key, mapping malformed input to `NotFound`
pub(crate) fn parse_key(key: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_hex(key).map_err(|_| StoreError::NotFound)
}

/// In-process store for development runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<ObjectId, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the map, recovering from poisoning
    ///
    /// Every critical section is a single insert or lookup, so a panicking
    /// holder cannot leave the map half-updated.
    fn lock_records(&self) -> MutexGuard<'_, HashMap<ObjectId, String>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn put(&self, value: &str) -> Result<ObjectId, StoreError> {
        let id = ObjectId::new();
        self.lock_records().insert(id, value.to_string());
        Ok(id)
    }

    async fn get(&self, key: &str) -> Result<String, StoreError> {
        let id = parse_key(key)?;
        self.lock_records().get(&id).cloned().ok_or(StoreError::NotFound)
    }
}

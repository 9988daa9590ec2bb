//! Store traits
//!
//! All calls are asynchronous and may fail with [`StoreError`]. Implementations
//! must be shareable across tasks.

use crate::error::StoreError;
use async_trait::async_trait;
use quill_entity::{CharacterRecord, StoreId, StoredCharacter};
use serde::{Deserialize, Serialize};

/// Durable character collection
#[async_trait]
pub trait DurableStore: Send + Sync + 'static {
    /// Every stored row, in primary-key order
    async fn load_all(&self) -> Result<Vec<StoredCharacter>, StoreError>;

    /// Insert a new row and return its assigned identifier
    async fn insert(&self, record: CharacterRecord) -> Result<StoreId, StoreError>;

    /// Insert or fully replace the row with this identifier
    async fn upsert(&self, character: StoredCharacter) -> Result<(), StoreError>;

    /// Delete the row; deleting an absent row is not an error
    async fn remove(&self, id: StoreId) -> Result<(), StoreError>;
}

/// Text of one method step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEntry {
    /// Step id, e.g. `"1"`
    pub id: String,
    /// Step text
    pub content: String,
}

impl StepEntry {
    /// Create entry
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }
}

/// Durable step text keyed by step id
#[async_trait]
pub trait StepStore: Send + Sync + 'static {
    /// Entries for the given ids, `None` where nothing is stored, same order
    async fn bulk_get(&self, ids: &[&str]) -> Result<Vec<Option<StepEntry>>, StoreError>;

    /// Insert or replace one entry
    async fn put(&self, entry: StepEntry) -> Result<(), StoreError>;
}

//! In-memory store
//!
//! Behaves like the on-disk store (auto-incrementing ids from 1, primary-key
//! ordering, upsert semantics) without touching the filesystem.

use crate::error::StoreError;
use crate::snapshot::{QuickSnapshot, SnapshotSlot};
use crate::store::{DurableStore, StepEntry, StepStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use quill_entity::{CharacterRecord, StoreId, StoredCharacter};
use std::collections::BTreeMap;

#[derive(Debug)]
struct MemoryState {
    next_id: u64,
    rows: BTreeMap<StoreId, StoredCharacter>,
    steps: BTreeMap<String, String>,
    snapshot: Option<String>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
            steps: BTreeMap::new(),
            snapshot: None,
        }
    }
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create store pre-populated with rows
    ///
    /// The id counter continues after the highest seeded id.
    #[must_use]
    pub fn with_rows(rows: impl IntoIterator<Item = StoredCharacter>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock();
            for row in rows {
                state.next_id = state.next_id.max(row.id.0 + 1);
                state.rows.insert(row.id, row);
            }
        }
        store
    }

    /// Number of stored rows
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.state.lock().rows.len()
    }

    /// Row by id
    #[must_use]
    pub fn row(&self, id: StoreId) -> Option<StoredCharacter> {
        self.state.lock().rows.get(&id).cloned()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<StoredCharacter>, StoreError> {
        Ok(self.state.lock().rows.values().cloned().collect())
    }

    async fn insert(&self, record: CharacterRecord) -> Result<StoreId, StoreError> {
        let mut state = self.state.lock();
        let id = StoreId(state.next_id);
        state.next_id += 1;
        state.rows.insert(id, StoredCharacter { id, record });
        Ok(id)
    }

    async fn upsert(&self, character: StoredCharacter) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.next_id = state.next_id.max(character.id.0 + 1);
        state.rows.insert(character.id, character);
        Ok(())
    }

    async fn remove(&self, id: StoreId) -> Result<(), StoreError> {
        self.state.lock().rows.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl StepStore for MemoryStore {
    async fn bulk_get(&self, ids: &[&str]) -> Result<Vec<Option<StepEntry>>, StoreError> {
        let state = self.state.lock();
        Ok(ids
            .iter()
            .map(|id| {
                state
                    .steps
                    .get(*id)
                    .map(|content| StepEntry::new(*id, content.clone()))
            })
            .collect())
    }

    async fn put(&self, entry: StepEntry) -> Result<(), StoreError> {
        self.state.lock().steps.insert(entry.id, entry.content);
        Ok(())
    }
}

#[async_trait]
impl SnapshotSlot for MemoryStore {
    async fn save_snapshot(&self, snapshot: &QuickSnapshot) -> Result<(), StoreError> {
        let blob = snapshot.to_blob()?;
        self.state.lock().snapshot = Some(blob);
        Ok(())
    }

    async fn load_snapshot(&self) -> Result<Option<QuickSnapshot>, StoreError> {
        let blob = self.state.lock().snapshot.clone();
        blob.as_deref().map(QuickSnapshot::from_blob).transpose()
    }
}

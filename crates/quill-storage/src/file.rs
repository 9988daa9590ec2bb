//! JSON file store
//!
//! Layout under the data directory:
//!
//! ```text
//! characters.json               { "next_id": n, "rows": [ ... ] }
//! steps.json                    { "1": "...", "2": "..." }
//! snowflake_quicksave_v1.json   quick-save blob
//! ```
//!
//! Every write goes to a temporary sibling and is renamed into place.
//! Read-modify-write cycles are serialized by an async mutex.

use crate::error::StoreError;
use crate::snapshot::{QuickSnapshot, SnapshotSlot, QUICKSAVE_KEY};
use crate::store::{DurableStore, StepEntry, StepStore};
use async_trait::async_trait;
use quill_entity::{CharacterRecord, StoreId, StoredCharacter};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const CHARACTERS_FILE: &str = "characters.json";
const STEPS_FILE: &str = "steps.json";

#[derive(Debug, Serialize, Deserialize)]
struct CharacterTable {
    next_id: u64,
    rows: Vec<StoredCharacter>,
}

impl Default for CharacterTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

/// Store persisting to JSON files in one directory
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_guard: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) a data directory
    ///
    /// # Errors
    /// `StoreError::Io` if the directory cannot be created
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io_error(&dir, e))?;
        tracing::debug!(dir = %dir.display(), "opened json file store");
        Ok(Self {
            dir,
            write_guard: Mutex::new(()),
        })
    }

    /// Data directory
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    async fn read_json<T>(&self, file: &str) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned,
    {
        let path = self.path(file);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::corrupt(path, e))
    }

    async fn write_json<T>(&self, file: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(file, &bytes).await
    }

    async fn write_bytes(&self, file: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path(file);
        let tmp = self.path(&format!("{file}.tmp"));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| StoreError::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StoreError::io_error(&path, e))?;
        tracing::trace!(path = %path.display(), bytes = bytes.len(), "wrote store file");
        Ok(())
    }

    async fn characters(&self) -> Result<CharacterTable, StoreError> {
        Ok(self.read_json(CHARACTERS_FILE).await?.unwrap_or_default())
    }

    async fn steps(&self) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(self.read_json(STEPS_FILE).await?.unwrap_or_default())
    }
}

#[async_trait]
impl DurableStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<StoredCharacter>, StoreError> {
        let mut rows = self.characters().await?.rows;
        rows.sort_by_key(|row| row.id);
        Ok(rows)
    }

    async fn insert(&self, record: CharacterRecord) -> Result<StoreId, StoreError> {
        let _guard = self.write_guard.lock().await;
        let mut table = self.characters().await?;
        let id = StoreId(table.next_id);
        table.next_id += 1;
        table.rows.push(StoredCharacter { id, record });
        self.write_json(CHARACTERS_FILE, &table).await?;
        Ok(id)
    }

    async fn upsert(&self, character: StoredCharacter) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock().await;
        let mut table = self.characters().await?;
        table.next_id = table.next_id.max(character.id.0 + 1);
        match table.rows.iter_mut().find(|row| row.id == character.id) {
            Some(row) => *row = character,
            None => table.rows.push(character),
        }
        self.write_json(CHARACTERS_FILE, &table).await
    }

    async fn remove(&self, id: StoreId) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock().await;
        let mut table = self.characters().await?;
        let before = table.rows.len();
        table.rows.retain(|row| row.id != id);
        if table.rows.len() == before {
            return Ok(());
        }
        self.write_json(CHARACTERS_FILE, &table).await
    }
}

#[async_trait]
impl StepStore for JsonFileStore {
    async fn bulk_get(&self, ids: &[&str]) -> Result<Vec<Option<StepEntry>>, StoreError> {
        let steps = self.steps().await?;
        Ok(ids
            .iter()
            .map(|id| steps.get(*id).map(|content| StepEntry::new(*id, content.clone())))
            .collect())
    }

    async fn put(&self, entry: StepEntry) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock().await;
        let mut steps = self.steps().await?;
        steps.insert(entry.id, entry.content);
        self.write_json(STEPS_FILE, &steps).await
    }
}

#[async_trait]
impl SnapshotSlot for JsonFileStore {
    async fn save_snapshot(&self, snapshot: &QuickSnapshot) -> Result<(), StoreError> {
        let blob = snapshot.to_blob()?;
        let _guard = self.write_guard.lock().await;
        self.write_bytes(&format!("{QUICKSAVE_KEY}.json"), blob.as_bytes())
            .await
    }

    async fn load_snapshot(&self) -> Result<Option<QuickSnapshot>, StoreError> {
        let path = self.path(&format!("{QUICKSAVE_KEY}.json"));
        let blob = match tokio::fs::read_to_string(&path).await {
            Ok(blob) => blob,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io_error(path, e)),
        };
        QuickSnapshot::from_blob(&blob).map(Some)
    }
}

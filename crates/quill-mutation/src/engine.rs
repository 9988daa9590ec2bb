//! Optimistic mutation engine
//!
//! Each mutation is applied to the in-memory collection first, then handed to
//! the durable store on a spawned task. The task commits or rolls back the
//! in-memory change on its own, so dropping the caller's future never leaves
//! an optimistic change unresolved.

use crate::attempt::{MutationAttempt, MutationKind};
use crate::collection::Collection;
use crate::config::EngineConfig;
use crate::error::MutationError;
use crate::serial::IdLocks;
use parking_lot::{Mutex, RwLock};
use quill_entity::{
    Character, CharacterRecord, CharacterUpdate, Clock, EntityId, NewCharacter, StoreId,
    StoredCharacter, SystemClock,
};
use quill_storage::DurableStore;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct CollectionState {
    items: Collection,
    loaded: bool,
}

/// State shared with background persistence tasks
#[derive(Debug)]
struct Shared {
    state: RwLock<CollectionState>,
    history: Mutex<VecDeque<MutationAttempt>>,
    history_limit: usize,
}

impl Shared {
    fn new(history_limit: usize) -> Self {
        Self {
            state: RwLock::new(CollectionState::default()),
            history: Mutex::new(VecDeque::with_capacity(history_limit.min(64))),
            history_limit,
        }
    }

    fn record(&self, attempt: MutationAttempt) {
        if self.history_limit == 0 {
            return;
        }
        let mut history = self.history.lock();
        while history.len() >= self.history_limit {
            history.pop_front();
        }
        history.push_back(attempt);
    }
}

/// Mediates every create, update and delete on the character collection
pub struct MutationEngine<S: DurableStore> {
    store: Arc<S>,
    shared: Arc<Shared>,
    clock: Arc<dyn Clock>,
    load_guard: tokio::sync::Mutex<()>,
    locks: Option<IdLocks>,
    config: EngineConfig,
}

impl<S: DurableStore> fmt::Debug for MutationEngine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutationEngine")
            .field("config", &self.config)
            .field("len", &self.len())
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

impl<S: DurableStore> MutationEngine<S> {
    /// Create engine with default configuration
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create engine with configuration
    #[must_use]
    pub fn with_config(store: Arc<S>, config: EngineConfig) -> Self {
        Self {
            store,
            shared: Arc::new(Shared::new(config.history_limit)),
            clock: Arc::new(SystemClock),
            load_guard: tokio::sync::Mutex::new(()),
            locks: config.serialize_per_id.then(IdLocks::new),
            config,
        }
    }

    /// With time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Engine configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Underlying durable store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// True once a bulk load has succeeded
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.shared.state.read().loaded
    }

    /// Number of characters, pending ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.state.read().items.len()
    }

    /// True if the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.state.read().items.is_empty()
    }

    /// Current characters in order
    #[must_use]
    pub fn characters(&self) -> Vec<Character> {
        self.shared.state.read().items.as_slice().to_vec()
    }

    /// Snapshot of the collection
    #[must_use]
    pub fn collection(&self) -> Collection {
        self.shared.state.read().items.clone()
    }

    /// Character with this id
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Character> {
        self.shared.state.read().items.get(id).cloned()
    }

    /// Recently finished attempts, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<MutationAttempt> {
        self.shared.history.lock().iter().cloned().collect()
    }

    /// Populate the collection from durable storage
    ///
    /// Runs at most once successfully. Concurrent callers wait for the first
    /// call and share its result. Characters created before the load finishes
    /// stay in the collection, after the loaded rows.
    ///
    /// # Errors
    /// `MutationError::Load` if the store fails; the collection is unchanged
    /// and a later call retries
    pub async fn load(&self) -> Result<(), MutationError> {
        if self.is_loaded() {
            return Ok(());
        }

        let _guard = self.load_guard.lock().await;
        if self.is_loaded() {
            return Ok(());
        }

        let rows = self.store.load_all().await.map_err(|source| {
            tracing::error!(error = %source, "failed to load characters");
            MutationError::Load(source)
        })?;

        let mut state = self.shared.state.write();
        let mut items = Collection::from_rows(rows);
        let pending: Vec<Character> = state
            .items
            .iter()
            .filter(|c| !items.contains(c.id))
            .cloned()
            .collect();
        for character in pending {
            items.push(character);
        }
        state.items = items;
        state.loaded = true;
        tracing::info!(count = state.items.len(), "characters loaded");
        Ok(())
    }

    /// Create a character
    ///
    /// The character is appended under a fresh local id before the store is
    /// called, and swapped in place for the persisted id on success.
    ///
    /// # Errors
    /// - `MutationError::Invalid` for blank fields; nothing is applied
    /// - `MutationError::Persistence` if the insert fails; the entry is removed
    pub async fn create(&self, input: NewCharacter) -> Result<Character, MutationError> {
        input.check()?;

        let now = self.clock.now_millis();
        let local = EntityId::fresh_local();
        let optimistic = Character {
            id: local,
            name: input.name,
            summary: input.summary,
            created_at: now,
            updated_at: now,
        };
        let record = optimistic.record();
        self.shared.state.write().items.push(optimistic);
        tracing::debug!(id = %local, "optimistic create applied");

        let task = tokio::spawn(persist_create(
            Arc::clone(&self.store),
            Arc::clone(&self.shared),
            local,
            record,
        ));
        join(task).await
    }

    /// Replace name and summary of an existing character
    ///
    /// `created_at` is preserved and `updated_at` never moves backwards.
    ///
    /// # Errors
    /// - `MutationError::Invalid` for blank fields
    /// - `MutationError::NotFound` if the id is absent
    /// - `MutationError::PendingPersistence` if the id is still local
    /// - `MutationError::Persistence` if the upsert fails; the previous
    ///   value is restored at its position
    pub async fn update(&self, input: CharacterUpdate) -> Result<Character, MutationError> {
        input.check()?;

        let id = input.id;
        let queue = self.queue(id).await;
        let now = self.clock.now_millis();

        let (previous, merged, stored) = {
            let mut state = self.shared.state.write();
            let previous = state
                .items
                .get(id)
                .cloned()
                .ok_or(MutationError::NotFound(id))?;
            let store_id = id
                .as_persisted()
                .ok_or(MutationError::PendingPersistence(id))?;

            let merged = Character {
                name: input.name,
                summary: input.summary,
                updated_at: now.max(previous.updated_at),
                ..previous.clone()
            };
            state.items.replace(id, merged.clone());
            let stored = StoredCharacter {
                id: store_id,
                record: merged.record(),
            };
            (previous, merged, stored)
        };
        tracing::debug!(id = %id, "optimistic update applied");

        let task = tokio::spawn(persist_update(
            Arc::clone(&self.store),
            Arc::clone(&self.shared),
            previous,
            merged,
            stored,
            queue,
        ));
        join(task).await
    }

    /// Remove a character
    ///
    /// # Errors
    /// - `MutationError::NotFound` if the id is absent
    /// - `MutationError::PendingPersistence` if the id is still local
    /// - `MutationError::Persistence` if the delete fails; the character is
    ///   re-appended at the end of the collection
    pub async fn delete(&self, id: EntityId) -> Result<(), MutationError> {
        let queue = self.queue(id).await;

        let (removed, store_id) = {
            let mut state = self.shared.state.write();
            if !state.items.contains(id) {
                return Err(MutationError::NotFound(id));
            }
            let store_id = id
                .as_persisted()
                .ok_or(MutationError::PendingPersistence(id))?;
            let removed = state.items.remove(id).ok_or(MutationError::NotFound(id))?;
            (removed, store_id)
        };
        tracing::debug!(id = %id, "optimistic delete applied");

        let task = tokio::spawn(persist_delete(
            Arc::clone(&self.store),
            Arc::clone(&self.shared),
            removed,
            store_id,
            queue,
        ));
        join(task).await?;

        if let Some(locks) = &self.locks {
            locks.forget(id);
        }
        Ok(())
    }

    async fn queue(&self, id: EntityId) -> Option<OwnedMutexGuard<()>> {
        match &self.locks {
            Some(locks) => Some(locks.acquire(id).await),
            None => None,
        }
    }
}

async fn join<T>(task: JoinHandle<Result<T, MutationError>>) -> Result<T, MutationError> {
    task.await
        .map_err(|e| MutationError::Interrupted(e.to_string()))?
}

async fn persist_create<S: DurableStore>(
    store: Arc<S>,
    shared: Arc<Shared>,
    local: EntityId,
    record: CharacterRecord,
) -> Result<Character, MutationError> {
    let mut attempt = MutationAttempt::begin(MutationKind::Create, local);

    let result = match store.insert(record.clone()).await {
        Ok(store_id) => {
            let persisted = Character::from_record(store_id.into(), record);
            attempt.commit(persisted.id)?;
            {
                let mut state = shared.state.write();
                if state.items.contains(persisted.id) {
                    // A reload already picked up the new row
                    state.items.remove(local);
                } else if !state.items.replace(local, persisted.clone()) {
                    tracing::warn!(local = %local, id = %store_id, "optimistic entry missing at commit");
                }
            }
            tracing::info!(local = %local, id = %store_id, "character created");
            Ok(persisted)
        }
        Err(source) => {
            attempt.roll_back(&source)?;
            shared.state.write().items.remove(local);
            tracing::error!(op = "create", id = %local, error = %source, "persistence failed, change rolled back");
            Err(MutationError::persistence(MutationKind::Create, source))
        }
    };

    shared.record(attempt);
    result
}

async fn persist_update<S: DurableStore>(
    store: Arc<S>,
    shared: Arc<Shared>,
    previous: Character,
    merged: Character,
    stored: StoredCharacter,
    _queue: Option<OwnedMutexGuard<()>>,
) -> Result<Character, MutationError> {
    let mut attempt = MutationAttempt::begin(MutationKind::Update, merged.id);

    let result = match store.upsert(stored).await {
        Ok(()) => {
            attempt.commit(merged.id)?;
            tracing::info!(id = %merged.id, "character updated");
            Ok(merged)
        }
        Err(source) => {
            attempt.roll_back(&source)?;
            let id = previous.id;
            shared.state.write().items.replace(id, previous);
            tracing::error!(op = "update", id = %id, error = %source, "persistence failed, change rolled back");
            Err(MutationError::persistence(MutationKind::Update, source))
        }
    };

    shared.record(attempt);
    result
}

async fn persist_delete<S: DurableStore>(
    store: Arc<S>,
    shared: Arc<Shared>,
    removed: Character,
    store_id: StoreId,
    _queue: Option<OwnedMutexGuard<()>>,
) -> Result<(), MutationError> {
    let mut attempt = MutationAttempt::begin(MutationKind::Delete, removed.id);

    let result = match store.remove(store_id).await {
        Ok(()) => {
            attempt.commit(removed.id)?;
            tracing::info!(id = %store_id, "character deleted");
            Ok(())
        }
        Err(source) => {
            attempt.roll_back(&source)?;
            {
                let mut state = shared.state.write();
                if !state.items.contains(removed.id) {
                    state.items.push(removed);
                }
            }
            tracing::error!(op = "delete", id = %store_id, error = %source, "persistence failed, change rolled back");
            Err(MutationError::persistence(MutationKind::Delete, source))
        }
    };

    shared.record(attempt);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::MutationPhase;
    use quill_storage::MemoryStore;
    use quill_test_utils::{stored, ManualClock};

    fn engine_with(rows: Vec<StoredCharacter>) -> MutationEngine<MemoryStore> {
        MutationEngine::new(Arc::new(MemoryStore::with_rows(rows)))
    }

    #[tokio::test]
    async fn load_populates_in_store_order() {
        let engine = engine_with(vec![stored(1, "Ava", "A pilot."), stored(2, "Bo", "A thief.")]);
        assert!(!engine.is_loaded());

        engine.load().await.unwrap();

        assert!(engine.is_loaded());
        let names: Vec<_> = engine.characters().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["Ava", "Bo"]);
    }

    #[tokio::test]
    async fn create_appends_with_persisted_id() {
        let engine = engine_with(vec![stored(1, "Ava", "A pilot.")]);
        engine.load().await.unwrap();

        let bo = engine.create(NewCharacter::new("Bo", "A thief.")).await.unwrap();

        assert_eq!(bo.id, EntityId::Persisted(StoreId(2)));
        assert_eq!(engine.collection().position(bo.id), Some(1));
        assert_eq!(engine.store().row_count(), 2);
    }

    #[tokio::test]
    async fn create_rejects_blank_name_without_applying() {
        let engine = engine_with(Vec::new());

        let err = engine.create(NewCharacter::new("  ", "Summary")).await.unwrap_err();

        assert!(matches!(err, MutationError::Invalid(_)));
        assert!(engine.is_empty());
        assert!(engine.history().is_empty());
    }

    #[tokio::test]
    async fn update_preserves_created_at_and_clamps_updated_at() {
        let clock = Arc::new(ManualClock::new(500));
        let engine = engine_with(vec![stored(1, "Ava", "A pilot.")]).with_clock(clock.clone());
        engine.load().await.unwrap();
        let before = engine.get(StoreId(1).into()).unwrap();

        let after = engine
            .update(CharacterUpdate::new(StoreId(1), "Ava", "A retired pilot."))
            .await
            .unwrap();

        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.updated_at, before.updated_at.max(500));
        assert_eq!(after.summary, "A retired pilot.");
    }

    #[tokio::test]
    async fn history_tracks_finished_attempts() {
        let store = Arc::new(MemoryStore::new());
        let engine = MutationEngine::with_config(store, EngineConfig::new().with_history_limit(2));

        for name in ["Ava", "Bo", "Cy"] {
            engine.create(NewCharacter::new(name, "s")).await.unwrap();
        }

        let history = engine.history();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|a| a.phase == MutationPhase::Committed));
        assert!(history.iter().all(|a| a.kind == MutationKind::Create));
        assert!(history.iter().all(|a| a.target.is_local()));
    }
}

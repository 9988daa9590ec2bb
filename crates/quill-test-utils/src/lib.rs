//! Testing utilities for Quill workspace
//!
//! Shared test doubles, fixtures, and async helpers.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use quill_entity::{CharacterRecord, Clock, StoreId, StoredCharacter};
use quill_provider::{ChatRequest, ChatResponse, ModelProvider, ProviderError};
use quill_storage::{DurableStore, MemoryStore, StoreError};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const FIXTURE_TIME: i64 = 1_700_000_000_000;

pub fn record(name: &str, summary: &str) -> CharacterRecord {
    CharacterRecord {
        name: name.to_string(),
        summary: summary.to_string(),
        created_at: FIXTURE_TIME,
        updated_at: FIXTURE_TIME,
    }
}

pub fn stored(id: u64, name: &str, summary: &str) -> StoredCharacter {
    StoredCharacter {
        id: StoreId(id),
        record: record(name, summary),
    }
}

/// Poll `condition` until it holds, yielding to spawned tasks in between
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    panic!("condition not reached");
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// FlakyStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    LoadAll,
    Insert,
    Upsert,
    Remove,
}

impl StoreOp {
    fn index(self) -> usize {
        match self {
            Self::LoadAll => 0,
            Self::Insert => 1,
            Self::Upsert => 2,
            Self::Remove => 3,
        }
    }
}

/// Holds calls of one operation until released
#[derive(Debug, Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
}

impl Gate {
    /// Let exactly one held call through
    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    /// Let every current and future call through
    pub fn open(&self) {
        self.permits.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

#[derive(Debug, Default)]
struct FailPlan {
    once: Vec<StoreOp>,
    always: HashSet<StoreOp>,
}

/// `MemoryStore` wrapper with scripted failures, call counters and gates
///
/// A failure is decided when the call proceeds past its gate, so a test can
/// arm `fail_next` while a call is held.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    plan: Mutex<FailPlan>,
    calls: [AtomicUsize; 4],
    gates: Mutex<[Option<Gate>; 4]>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: impl IntoIterator<Item = StoredCharacter>) -> Self {
        Self {
            inner: MemoryStore::with_rows(rows),
            ..Self::default()
        }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn fail_next(&self, op: StoreOp) {
        self.plan.lock().once.push(op);
    }

    pub fn fail_always(&self, op: StoreOp) {
        self.plan.lock().always.insert(op);
    }

    pub fn heal(&self) {
        *self.plan.lock() = FailPlan::default();
    }

    pub fn calls(&self, op: StoreOp) -> usize {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Hold every later call of `op` until the returned gate lets it through
    pub fn hold(&self, op: StoreOp) -> Gate {
        let gate = Gate {
            permits: Arc::new(Semaphore::new(0)),
        };
        self.gates.lock()[op.index()] = Some(gate.clone());
        gate
    }

    async fn enter(&self, op: StoreOp) -> Result<(), StoreError> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);

        let gate = self.gates.lock()[op.index()].clone();
        if let Some(gate) = gate {
            gate.permits
                .acquire()
                .await
                .map_err(|_| StoreError::Unavailable("gate closed".to_string()))?
                .forget();
        }

        let mut plan = self.plan.lock();
        if plan.always.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} always fails")));
        }
        if let Some(idx) = plan.once.iter().position(|o| *o == op) {
            plan.once.remove(idx);
            return Err(StoreError::Unavailable(format!("{op:?} failed once")));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    async fn load_all(&self) -> Result<Vec<StoredCharacter>, StoreError> {
        self.enter(StoreOp::LoadAll).await?;
        self.inner.load_all().await
    }

    async fn insert(&self, record: CharacterRecord) -> Result<StoreId, StoreError> {
        self.enter(StoreOp::Insert).await?;
        self.inner.insert(record).await
    }

    async fn upsert(&self, character: StoredCharacter) -> Result<(), StoreError> {
        self.enter(StoreOp::Upsert).await?;
        self.inner.upsert(character).await
    }

    async fn remove(&self, id: StoreId) -> Result<(), StoreError> {
        self.enter(StoreOp::Remove).await?;
        self.inner.remove(id).await
    }
}

// ---------------------------------------------------------------------------
// ScriptedProvider
// ---------------------------------------------------------------------------

/// Provider that replays queued responses and records every request
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ChatResponse, ProviderError>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with `text` as message content
    pub fn reply(self, text: &str) -> Self {
        self.script.lock().push_back(Ok(ChatResponse::from_content(text)));
        self
    }

    /// Queue a raw response body
    pub fn respond(self, response: ChatResponse) -> Self {
        self.script.lock().push_back(Ok(response));
        self
    }

    /// Queue an error
    pub fn fail(self, error: ProviderError) -> Self {
        self.script.lock().push_back(Err(error));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        self.requests.lock().push(request);
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::MalformedResponse("script exhausted".to_string())))
    }
}

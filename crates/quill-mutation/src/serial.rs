//! Per-id mutation queue
//!
//! Update and delete calls on the same id wait for each other when
//! serialization is enabled. The guard travels with the background
//! persistence task, so ordering holds even if a caller stops waiting.

use dashmap::DashMap;
use quill_entity::EntityId;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub(crate) struct IdLocks {
    locks: DashMap<EntityId, Arc<Mutex<()>>>,
}

impl IdLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Wait for every earlier mutation on `id` to settle
    pub(crate) async fn acquire(&self, id: EntityId) -> OwnedMutexGuard<()> {
        // Clone out of the map before awaiting so no shard lock is held
        let lock = Arc::clone(self.locks.entry(id).or_default().value());
        lock.lock_owned().await
    }

    /// Drop the queue for an id that no longer exists
    pub(crate) fn forget(&self, id: EntityId) {
        self.locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_entity::StoreId;
    use std::time::Duration;

    #[tokio::test]
    async fn same_id_waits() {
        let locks = IdLocks::new();
        let id = EntityId::from(StoreId(1));

        let first = locks.acquire(id).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.acquire(id)).await;
        assert!(second.is_err());

        drop(first);
        let third = tokio::time::timeout(Duration::from_millis(20), locks.acquire(id)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn different_ids_do_not_wait() {
        let locks = IdLocks::new();
        let _a = locks.acquire(StoreId(1).into()).await;
        let b = tokio::time::timeout(Duration::from_millis(20), locks.acquire(StoreId(2).into())).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn forget_keeps_held_locks() {
        let locks = IdLocks::new();
        let id = EntityId::from(StoreId(1));

        let guard = locks.acquire(id).await;
        locks.forget(id);
        assert!(locks.locks.contains_key(&id));

        drop(guard);
        locks.forget(id);
        assert!(!locks.locks.contains_key(&id));
    }
}

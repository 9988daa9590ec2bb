//! Entity identifiers
//!
//! A character is addressed by exactly one [`EntityId`] at any instant:
//! a [`LocalId`] while its creation is in flight, then the [`StoreId`]
//! handed back by durable storage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_LOCAL: AtomicU64 = AtomicU64::new(1);

/// Ephemeral identifier assigned at optimistic insert
///
/// Never persisted. Allocation is process-wide and strictly increasing, so a
/// value is never handed out twice in the same process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LocalId(u64);

impl LocalId {
    /// Allocate the next local identifier
    #[inline]
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_LOCAL.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

/// Durable identifier assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(pub u64);

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for StoreId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Identifier of a character in the in-memory collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntityId {
    /// Optimistic placeholder, durable insert still pending
    Local(LocalId),
    /// Confirmed by durable storage
    Persisted(StoreId),
}

impl EntityId {
    /// Allocate a fresh local identifier
    #[inline]
    #[must_use]
    pub fn fresh_local() -> Self {
        Self::Local(LocalId::next())
    }

    /// True while the durable insert has not been confirmed
    #[inline]
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// Durable id, if confirmed
    #[inline]
    #[must_use]
    pub fn as_persisted(&self) -> Option<StoreId> {
        match self {
            Self::Persisted(id) => Some(*id),
            Self::Local(_) => None,
        }
    }
}

impl From<StoreId> for EntityId {
    fn from(id: StoreId) -> Self {
        Self::Persisted(id)
    }
}

impl From<LocalId> for EntityId {
    fn from(id: LocalId) -> Self {
        Self::Local(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(id) => write!(f, "{id}"),
            Self::Persisted(id) => write!(f, "{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn local_ids_never_repeat() {
        let ids: HashSet<LocalId> = (0..1000).map(|_| LocalId::next()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn local_and_persisted_never_collide() {
        let local = EntityId::Local(LocalId(7));
        let persisted = EntityId::Persisted(StoreId(7));
        assert_ne!(local, persisted);
    }

    #[test]
    fn entity_id_accessors() {
        let local = EntityId::fresh_local();
        assert!(local.is_local());
        assert_eq!(local.as_persisted(), None);

        let persisted = EntityId::from(StoreId(3));
        assert!(!persisted.is_local());
        assert_eq!(persisted.as_persisted(), Some(StoreId(3)));
    }

    #[test]
    fn store_id_parse() {
        assert_eq!(" 42 ".parse::<StoreId>().unwrap(), StoreId(42));
        assert!("abc".parse::<StoreId>().is_err());
    }

    #[test]
    fn display_forms() {
        assert_eq!(EntityId::Local(LocalId(5)).to_string(), "local-5");
        assert_eq!(EntityId::Persisted(StoreId(5)).to_string(), "5");
    }

    #[test]
    fn entity_id_serializes_tagged() {
        let json = serde_json::to_value(EntityId::Persisted(StoreId(9))).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "persisted", "value": 9}));
    }
}

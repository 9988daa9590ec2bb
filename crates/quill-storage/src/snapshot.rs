//! Quick-save snapshot of step text
//!
//! A manual export/import of the step text only, independent of the
//! character collection. Stored as one JSON blob under [`QUICKSAVE_KEY`].

use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Fixed storage key of the quick-save blob
pub const QUICKSAVE_KEY: &str = "snowflake_quicksave_v1";

/// Blob format version written by this crate
pub const SNAPSHOT_VERSION: u32 = 1;

/// Exported step state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickSnapshot {
    /// Format version
    pub version: u32,
    /// Step the user was on
    #[serde(default = "first_step", deserialize_with = "step_number")]
    pub current_step: u8,
    /// Step id to text
    #[serde(default)]
    pub steps: BTreeMap<String, String>,
    /// Epoch millis at export
    #[serde(default)]
    pub created_at: i64,
}

impl QuickSnapshot {
    /// Snapshot of the given state stamped at `created_at`
    #[must_use]
    pub fn new(current_step: u8, steps: BTreeMap<String, String>, created_at: i64) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            current_step,
            steps,
            created_at,
        }
    }

    /// Encode as the stored JSON blob
    ///
    /// # Errors
    /// `StoreError::Serialize` if encoding fails
    pub fn to_blob(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a stored blob, rejecting foreign versions
    ///
    /// # Errors
    /// - `StoreError::Serialize` if the blob is not a snapshot object
    /// - `StoreError::UnsupportedSnapshot` if the version is not 1
    pub fn from_blob(blob: &str) -> Result<Self, StoreError> {
        let snapshot: Self = serde_json::from_str(blob)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::UnsupportedSnapshot(snapshot.version));
        }
        Ok(snapshot)
    }
}

fn first_step() -> u8 {
    1
}

// Older exports stored the step as a string
fn step_number<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Step {
        Number(u8),
        Text(String),
    }

    match Step::deserialize(deserializer)? {
        Step::Number(n) => Ok(n),
        Step::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Single-slot storage for the quick-save blob
#[async_trait]
pub trait SnapshotSlot: Send + Sync + 'static {
    /// Overwrite the slot
    async fn save_snapshot(&self, snapshot: &QuickSnapshot) -> Result<(), StoreError>;

    /// Read the slot, `None` if nothing was saved
    async fn load_snapshot(&self) -> Result<Option<QuickSnapshot>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_blob_shape() {
        let mut steps = BTreeMap::new();
        steps.insert("1".to_string(), "A hook.".to_string());
        let snapshot = QuickSnapshot::new(2, steps, 1_700_000_000_000);

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_blob().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "version": 1,
                "currentStep": 2,
                "steps": {"1": "A hook."},
                "createdAt": 1_700_000_000_000_i64
            })
        );
    }

    #[test]
    fn snapshot_accepts_string_step() {
        let snapshot =
            QuickSnapshot::from_blob(r#"{"version":1,"currentStep":"2","steps":{}}"#).unwrap();
        assert_eq!(snapshot.current_step, 2);
        assert_eq!(snapshot.created_at, 0);
    }

    #[test]
    fn snapshot_defaults_missing_fields() {
        let snapshot = QuickSnapshot::from_blob(r#"{"version":1}"#).unwrap();
        assert_eq!(snapshot.current_step, 1);
        assert!(snapshot.steps.is_empty());
    }

    #[test]
    fn snapshot_rejects_other_versions() {
        let err = QuickSnapshot::from_blob(r#"{"version":2}"#).unwrap_err();
        assert!(matches!(err, StoreError::UnsupportedSnapshot(2)));
    }

    #[test]
    fn snapshot_rejects_non_object() {
        assert!(QuickSnapshot::from_blob("[1,2,3]").is_err());
        assert!(QuickSnapshot::from_blob("not json").is_err());
    }
}

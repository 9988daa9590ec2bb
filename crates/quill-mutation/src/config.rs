//! Engine configuration

use serde::{Deserialize, Serialize};

/// Mutation engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Queue update/delete calls on the same id behind each other
    pub serialize_per_id: bool,
    /// Finished attempts kept for inspection
    pub history_limit: usize,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With per-id serialization
    #[inline]
    #[must_use]
    pub fn with_serialize_per_id(mut self, enabled: bool) -> Self {
        self.serialize_per_id = enabled;
        self
    }

    /// With history limit
    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            serialize_per_id: false,
            history_limit: 64,
        }
    }
}

//! Mutation engine errors
//!
//! Two families:
//! - validation failures (`NotFound`, `PendingPersistence`, `Invalid`) are
//!   returned before any storage call
//! - persistence failures (`Load`, `Persistence`) come from the store; for
//!   mutations the optimistic change has already been rolled back

use crate::attempt::{MutationKind, MutationPhase};
use quill_entity::{EntityId, InputError};
use quill_storage::StoreError;

/// Mutation engine error
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// No character with this id in the collection
    #[error("character not found: {0}")]
    NotFound(EntityId),

    /// Character exists but its durable insert has not completed
    #[error("character {0} is still being saved")]
    PendingPersistence(EntityId),

    /// Caller input rejected
    #[error("invalid input: {0}")]
    Invalid(#[from] InputError),

    /// Bulk load failed; the collection was left untouched
    #[error("failed to load characters: {0}")]
    Load(#[source] StoreError),

    /// Durable call failed; the optimistic change was rolled back
    #[error("{kind} failed and was rolled back: {source}")]
    Persistence {
        /// Operation that failed
        kind: MutationKind,
        /// Store error
        #[source]
        source: StoreError,
    },

    /// Attempt state machine misuse
    #[error("illegal mutation transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Current phase
        from: MutationPhase,
        /// Requested phase
        to: MutationPhase,
    },

    /// Background persistence task did not complete
    #[error("mutation task interrupted: {0}")]
    Interrupted(String),
}

impl MutationError {
    /// Create persistence error
    pub fn persistence(kind: MutationKind, source: StoreError) -> Self {
        Self::Persistence { kind, source }
    }

    /// Caller error detected before storage was touched
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::PendingPersistence(_) | Self::Invalid(_)
        )
    }

    /// Failure reported by durable storage
    #[inline]
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Load(_) | Self::Persistence { .. })
    }

    /// Message suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "That character no longer exists.".to_string(),
            Self::PendingPersistence(_) => {
                "That character is still being saved. Try again in a moment.".to_string()
            }
            Self::Invalid(input) => input.user_message(),
            Self::Load(_) => "Could not load characters. Try again.".to_string(),
            Self::Persistence { .. } | Self::IllegalTransition { .. } | Self::Interrupted(_) => {
                "Save failed. Try again.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_entity::{Field, StoreId};
    use std::error::Error as _;

    #[test]
    fn mutation_error_display() {
        let err = MutationError::NotFound(StoreId(4).into());
        assert_eq!(err.to_string(), "character not found: 4");

        let err = MutationError::persistence(
            MutationKind::Update,
            StoreError::Unavailable("offline".to_string()),
        );
        assert_eq!(
            err.to_string(),
            "update failed and was rolled back: storage unavailable: offline"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn error_families() {
        assert!(MutationError::NotFound(StoreId(1).into()).is_validation());
        assert!(MutationError::Invalid(InputError::Missing(Field::Name)).is_validation());
        assert!(!MutationError::Load(StoreError::Unavailable(String::new())).is_validation());

        let err = MutationError::persistence(
            MutationKind::Create,
            StoreError::Unavailable(String::new()),
        );
        assert!(err.is_persistence());
        assert!(!err.is_validation());
    }

    #[test]
    fn user_messages_distinguish_failures() {
        let save = MutationError::persistence(
            MutationKind::Create,
            StoreError::Unavailable(String::new()),
        );
        assert_eq!(save.user_message(), "Save failed. Try again.");

        let invalid = MutationError::from(InputError::Missing(Field::Summary));
        assert_eq!(invalid.user_message(), "Both name and summary are required.");
    }
}

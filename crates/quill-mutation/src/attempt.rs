//! Mutation attempt state machine
//!
//! Every create, update and delete is tracked as one attempt that starts
//! `Pending` and ends in exactly one of `Committed` or `RolledBack`.

use crate::error::MutationError;
use quill_entity::EntityId;
use serde::Serialize;
use std::fmt;

/// Kind of collection mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    /// Optimistic insert followed by durable insert
    Create,
    /// In-place replace followed by durable upsert
    Update,
    /// Optimistic removal followed by durable delete
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// Phase of a mutation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationPhase {
    /// Applied in memory, durable call outstanding
    Pending,
    /// Durable call succeeded
    Committed,
    /// Durable call failed and the in-memory change was reverted
    RolledBack,
}

impl MutationPhase {
    /// True once the attempt can no longer change
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Phases reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: MutationPhase) -> &'static [MutationPhase] {
    use MutationPhase::{Committed, Pending, RolledBack};
    match from {
        Pending => &[Committed, RolledBack],
        Committed | RolledBack => &[],
    }
}

/// Validate a phase transition
///
/// # Errors
/// `MutationError::IllegalTransition` if `to` is not reachable from `from`
pub fn validate_transition(from: MutationPhase, to: MutationPhase) -> Result<(), MutationError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(MutationError::IllegalTransition { from, to })
    }
}

/// One tracked mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationAttempt {
    /// What was attempted
    pub kind: MutationKind,
    /// Identifier the attempt was issued against
    pub target: EntityId,
    /// Identifier after commit (differs from `target` for creates)
    pub resolved: Option<EntityId>,
    /// Current phase
    pub phase: MutationPhase,
    /// Cause recorded on rollback
    pub failure: Option<String>,
}

impl MutationAttempt {
    /// Start a pending attempt
    #[inline]
    #[must_use]
    pub fn begin(kind: MutationKind, target: EntityId) -> Self {
        Self {
            kind,
            target,
            resolved: None,
            phase: MutationPhase::Pending,
            failure: None,
        }
    }

    /// Move to `Committed`
    ///
    /// # Errors
    /// `MutationError::IllegalTransition` if already terminal
    pub fn commit(&mut self, resolved: EntityId) -> Result<(), MutationError> {
        validate_transition(self.phase, MutationPhase::Committed)?;
        self.phase = MutationPhase::Committed;
        self.resolved = Some(resolved);
        Ok(())
    }

    /// Move to `RolledBack`, recording the cause
    ///
    /// # Errors
    /// `MutationError::IllegalTransition` if already terminal
    pub fn roll_back(&mut self, cause: impl fmt::Display) -> Result<(), MutationError> {
        validate_transition(self.phase, MutationPhase::RolledBack)?;
        self.phase = MutationPhase::RolledBack;
        self.failure = Some(cause.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_entity::StoreId;

    #[test]
    fn pending_transitions() {
        assert!(validate_transition(MutationPhase::Pending, MutationPhase::Committed).is_ok());
        assert!(validate_transition(MutationPhase::Pending, MutationPhase::RolledBack).is_ok());
        assert!(validate_transition(MutationPhase::Pending, MutationPhase::Pending).is_err());
    }

    #[test]
    fn terminal_phases_are_final() {
        for from in [MutationPhase::Committed, MutationPhase::RolledBack] {
            assert!(from.is_terminal());
            assert!(allowed_transitions(from).is_empty());
            for to in [
                MutationPhase::Pending,
                MutationPhase::Committed,
                MutationPhase::RolledBack,
            ] {
                assert!(matches!(
                    validate_transition(from, to),
                    Err(MutationError::IllegalTransition { .. })
                ));
            }
        }
    }

    #[test]
    fn attempt_commit_records_resolved_id() {
        let target = EntityId::fresh_local();
        let mut attempt = MutationAttempt::begin(MutationKind::Create, target);
        attempt.commit(EntityId::Persisted(StoreId(8))).unwrap();

        assert_eq!(attempt.phase, MutationPhase::Committed);
        assert_eq!(attempt.resolved, Some(EntityId::Persisted(StoreId(8))));
        assert!(attempt.roll_back("late failure").is_err());
    }

    #[test]
    fn attempt_roll_back_records_cause() {
        let mut attempt = MutationAttempt::begin(MutationKind::Delete, StoreId(2).into());
        attempt.roll_back("disk full").unwrap();

        assert_eq!(attempt.phase, MutationPhase::RolledBack);
        assert_eq!(attempt.failure.as_deref(), Some("disk full"));
        assert!(attempt.commit(StoreId(2).into()).is_err());
    }

    #[test]
    fn mutation_kind_display() {
        assert_eq!(MutationKind::Create.to_string(), "create");
        assert_eq!(MutationKind::Update.to_string(), "update");
        assert_eq!(MutationKind::Delete.to_string(), "delete");
    }
}

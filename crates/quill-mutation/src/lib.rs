//! Quill Mutation Engine
//!
//! Owns the in-memory character collection and mediates every create, update
//! and delete against it, coordinating with a [`DurableStore`].
//!
//! # Core Concepts
//!
//! - [`MutationEngine`]: Optimistic apply, async persist, commit or roll back
//! - [`MutationAttempt`]: Per-mutation state machine (`Pending → Committed | RolledBack`)
//! - [`Collection`]: Ordered, duplicate-free sequence of characters
//! - [`EngineConfig`]: Optional per-id serialization and history bounds
//!
//! # Lifecycle
//!
//! ```text
//! create(input) ──► append Local(id) ──► store.insert ──┬─ Ok(id)  ─► swap Local → Persisted   (Committed)
//!                                                       └─ Err     ─► remove Local entry       (RolledBack)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_mutation::MutationEngine;
//! use quill_entity::NewCharacter;
//! use quill_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = MutationEngine::new(Arc::new(MemoryStore::new()));
//! engine.load().await?;
//!
//! let ava = engine.create(NewCharacter::new("Ava", "A pilot.")).await?;
//! assert!(!ava.id.is_local());
//! # Ok(())
//! # }
//! ```
//!
//! [`DurableStore`]: quill_storage::DurableStore

#![warn(unreachable_pub)]

// Core modules
mod attempt;
mod collection;
mod config;
mod engine;
mod error;
mod serial;

// Re-exports
pub use attempt::{allowed_transitions, validate_transition, MutationAttempt, MutationKind, MutationPhase};
pub use collection::Collection;
pub use config::EngineConfig;
pub use engine::MutationEngine;
pub use error::MutationError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

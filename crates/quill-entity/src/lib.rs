//! Quill Entity Model
//!
//! Characters and the identifiers that address them across their lifecycle.
//!
//! # Core Concepts
//!
//! - [`Character`]: The entity managed by the mutation engine
//! - [`EntityId`]: Tagged identifier, `Local` before persistence, `Persisted` after
//! - [`CharacterRecord`]: Normalized durable row (no identifier)
//! - [`StoredCharacter`]: Durable row together with its [`StoreId`]
//! - [`CharacterDraft`]: Interactive input, trimmed and length-checked
//! - [`Clock`]: Time source for `created_at` / `updated_at` stamps
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_entity::{CharacterDraft, EntityId, LocalId};
//!
//! let input = CharacterDraft::new("  Ava ", "A pilot.").validate()?;
//! assert_eq!(input.name, "Ava");
//!
//! let id = EntityId::Local(LocalId::next());
//! assert!(id.is_local());
//! ```

#![warn(unreachable_pub)]

// Core modules
mod character;
mod clock;
mod draft;
mod error;
mod id;

// Re-exports
pub use character::{Character, CharacterRecord, CharacterUpdate, NewCharacter, StoredCharacter};
pub use clock::{Clock, SystemClock};
pub use draft::{CharacterDraft, INTERACTIVE_SUMMARY_CAP};
pub use error::{Field, InputError};
pub use id::{EntityId, LocalId, StoreId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Quill Storage
//!
//! Durable collaborators behind the in-memory state:
//!
//! - [`DurableStore`]: character rows (`load_all`, `insert`, `upsert`, `remove`)
//! - [`StepStore`]: step text keyed by step id (`bulk_get`, `put`)
//! - [`SnapshotSlot`]: a single quick-save blob under a fixed key
//!
//! Two backends implement all three: [`MemoryStore`] for tests and embedding,
//! [`JsonFileStore`] for on-disk persistence under a data directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_storage::{DurableStore, JsonFileStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonFileStore::open(".quill").await?;
//! let rows = store.load_all().await?;
//! println!("{} characters on disk", rows.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
mod error;
mod file;
mod memory;
mod snapshot;
mod store;

// Re-exports
pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use snapshot::{QuickSnapshot, SnapshotSlot, QUICKSAVE_KEY, SNAPSHOT_VERSION};
pub use store::{DurableStore, StepEntry, StepStore};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

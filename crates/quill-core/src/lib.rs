//! Quill Core
//!
//! Story state and the writing assistant built on top of the character
//! engine, ingestion and model provider crates.
//!
//! # Core Concepts
//!
//! - [`StoryState`] / [`StorySession`]: Snowflake steps, step storage and quick save
//! - [`Task`]: `generate`, `brainstorm`, `refine` and `suggest-characters`
//! - [`Assistant`]: Builds prompts, calls the model and routes the reply
//! - [`AdoptionReport`]: Result of adopting suggested characters one by one
//! - [`QuillConfig`]: TOML configuration with `QUILL_*` overrides
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_core::{Assistant, MutationEngine, StoryState, Task, TaskOutcome};
//!
//! let engine = Arc::new(MutationEngine::new(store));
//! engine.load().await?;
//! let assistant = Assistant::new(engine, provider);
//!
//! let mut story = StoryState::new();
//! story.set_current_text("A lighthouse keeper finds a door in the sea.");
//! story.enter_step(3)?;
//!
//! if let TaskOutcome::Characters(records) =
//!     assistant.run_task(Task::SuggestCharacters, &story, None).await?
//! {
//!     let report = assistant.adopt_characters(&records).await;
//!     println!("{}", report.user_message());
//! }
//! ```

#![warn(unreachable_pub)]

// Core modules
mod assistant;
mod config;
mod error;
mod prompt;
mod story;
mod task;

// Re-exports
pub use assistant::{AdoptionFailure, AdoptionReport, Assistant, TaskOutcome};
pub use config::{ConfigError, QuillConfig, StorageConfig};
pub use error::{AssistantError, TaskError};
pub use prompt::{build_request, user_prompt, CHARACTERS_FORMAT, IDEAS_FORMAT, SYSTEM_PROMPT};
pub use story::{step_title, StoryState, StorySession, FIRST_STEP, LAST_STEP, TEXT_STEPS};
pub use task::{Expectation, Task};

// Re-exports from workspace crates
pub use quill_entity::{Character, CharacterDraft, CharacterUpdate, EntityId, NewCharacter, StoreId};
pub use quill_ingest::{IngestFailure, StoryIdea, ValidatedRecord};
pub use quill_mutation::{EngineConfig, MutationEngine, MutationError};
pub use quill_provider::{HttpProvider, ModelProvider, ProviderConfig, ProviderError};
pub use quill_storage::{JsonFileStore, MemoryStore, QuickSnapshot, StoreError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

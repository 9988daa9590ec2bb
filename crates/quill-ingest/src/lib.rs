//! Quill Response Ingestion
//!
//! Turns untrusted model output into validated records, or a structured
//! failure carrying a bounded preview of the raw text.
//!
//! # Core Concepts
//!
//! - [`extract`]: Parse JSON, retrying once with code fences stripped
//! - [`validate`]: Keep well-formed array elements, drop the rest silently
//! - [`ingest`]: `extract` then `validate`; pure and never panics
//! - [`Candidate`]: Record shape accepted from a model ([`ValidatedRecord`], [`StoryIdea`])
//! - [`Preview`]: First 500 characters of the raw response
//!
//! # Example
//!
//! ```rust,ignore
//! use quill_ingest::{ingest, ValidatedRecord};
//!
//! let records = ingest::<ValidatedRecord>(r#"[{"name":"Ava","summary":"A pilot."}]"#)?;
//! assert_eq!(records[0].name, "Ava");
//! ```

#![warn(unreachable_pub)]

// Core modules
mod adopt;
mod candidate;
mod error;
mod extract;
mod preview;
mod validate;

// Re-exports
pub use adopt::{clamp_for_adoption, ADOPTION_SUMMARY_CAP};
pub use candidate::{Candidate, StoryIdea, ValidatedRecord, SUGGESTION_SUMMARY_CAP};
pub use error::IngestFailure;
pub use extract::{extract, strip_fences};
pub use preview::{truncate_chars, Preview, PREVIEW_CHARS};
pub use validate::{ingest, validate, IngestOutcome};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Ingestion failures
//!
//! Returned as values, never raised: the caller decides how to show them.

use crate::preview::Preview;

/// Why a raw response yielded no records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestFailure {
    /// Not JSON, or JSON of the wrong overall shape
    #[error("unexpected response format")]
    ParseFailure(Preview),

    /// A JSON array, but no element passed validation
    #[error("no valid records in response")]
    NoValidRecords(Preview),
}

impl IngestFailure {
    /// Preview of the raw response
    #[must_use]
    pub fn preview(&self) -> &Preview {
        match self {
            Self::ParseFailure(preview) | Self::NoValidRecords(preview) => preview,
        }
    }

    /// Markdown message with the preview in a fenced block
    #[must_use]
    pub fn user_message(&self) -> String {
        let lead = match self {
            Self::ParseFailure(_) => "Sorry, I received an unexpected format.",
            Self::NoValidRecords(_) => "Sorry, I couldn't generate valid character suggestions.",
        };
        format!(
            "{lead} Here is the raw response:\n\n```\n{}\n```",
            self.preview()
        )
    }
}

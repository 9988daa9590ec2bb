//! Interactive character input
//!
//! Form input is trimmed and checked here before it reaches the mutation
//! engine. Over-long summaries are rejected, never truncated.

use crate::character::NewCharacter;
use crate::error::{Field, InputError};

/// Summary cap for characters typed in by the user
pub const INTERACTIVE_SUMMARY_CAP: usize = 280;

/// Untrimmed form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterDraft {
    /// Raw name text
    pub name: String,
    /// Raw summary text
    pub summary: String,
}

impl CharacterDraft {
    /// Create draft
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
        }
    }

    /// Length of the trimmed summary in characters
    #[must_use]
    pub fn summary_len(&self) -> usize {
        self.summary.trim().chars().count()
    }

    /// True when the trimmed summary is over the interactive cap
    #[must_use]
    pub fn is_over_limit(&self) -> bool {
        self.summary_len() > INTERACTIVE_SUMMARY_CAP
    }

    /// Trim and validate into create input
    ///
    /// # Errors
    /// - `InputError::Missing` if name or summary is blank
    /// - `InputError::SummaryTooLong` if the summary exceeds 280 characters
    pub fn validate(&self) -> Result<NewCharacter, InputError> {
        let name = self.name.trim();
        let summary = self.summary.trim();

        if name.is_empty() {
            return Err(InputError::Missing(Field::Name));
        }
        if summary.is_empty() {
            return Err(InputError::Missing(Field::Summary));
        }

        let len = summary.chars().count();
        if len > INTERACTIVE_SUMMARY_CAP {
            return Err(InputError::SummaryTooLong {
                len,
                max: INTERACTIVE_SUMMARY_CAP,
            });
        }

        Ok(NewCharacter::new(name, summary))
    }
}

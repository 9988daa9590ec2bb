//! Preparing suggested characters for creation

use crate::candidate::ValidatedRecord;
use crate::preview::truncate_chars;
use quill_entity::NewCharacter;

/// Summary cap applied when a suggestion is adopted
pub const ADOPTION_SUMMARY_CAP: usize = 1000;

/// Create input for an adopted suggestion
///
/// The name is trimmed and the summary truncated to
/// [`ADOPTION_SUMMARY_CAP`] characters. Never rejects.
#[must_use]
pub fn clamp_for_adoption(record: &ValidatedRecord) -> NewCharacter {
    let (summary, truncated) = truncate_chars(record.summary.trim(), ADOPTION_SUMMARY_CAP);
    if truncated {
        tracing::debug!(name = %record.name, "adopted summary truncated");
    }
    NewCharacter::new(record.name.trim(), summary)
}

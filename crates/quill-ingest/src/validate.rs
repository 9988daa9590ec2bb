//! Element validation and the full ingestion pipeline

use crate::candidate::{Candidate, ValidatedRecord};
use crate::error::IngestFailure;
use crate::extract::extract;
use crate::preview::Preview;
use serde_json::Value;

/// Validated records or a structured failure
pub type IngestOutcome<C = ValidatedRecord> = Result<Vec<C>, IngestFailure>;

/// Keep the array elements that form a valid `C`
///
/// `raw` is only used for the failure preview.
///
/// # Errors
/// - `IngestFailure::ParseFailure` if `value` is not an array
/// - `IngestFailure::NoValidRecords` if no element survives
pub fn validate<C: Candidate>(value: &Value, raw: &str) -> IngestOutcome<C> {
    let Some(elements) = value.as_array() else {
        tracing::warn!(kind = C::KIND, "response is not an array");
        return Err(IngestFailure::ParseFailure(Preview::of(raw)));
    };

    let records: Vec<C> = elements.iter().filter_map(C::from_element).collect();
    if records.is_empty() {
        tracing::warn!(kind = C::KIND, elements = elements.len(), "no valid records in response");
        return Err(IngestFailure::NoValidRecords(Preview::of(raw)));
    }

    tracing::debug!(
        kind = C::KIND,
        kept = records.len(),
        dropped = elements.len() - records.len(),
        "response validated"
    );
    Ok(records)
}

/// Extract then validate
///
/// # Errors
/// See [`extract`] and [`validate`]
pub fn ingest<C: Candidate>(raw: &str) -> IngestOutcome<C> {
    let value = extract(raw)?;
    validate(&value, raw)
}

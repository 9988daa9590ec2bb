//! Record shapes accepted from model output

use crate::preview::truncate_chars;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Summary cap applied to suggested characters; names are bounded by it too
pub const SUGGESTION_SUMMARY_CAP: usize = 280;

/// A record shape that can be recovered from one JSON array element
pub trait Candidate: Sized {
    /// Short label used in logs
    const KIND: &'static str;

    /// Build from one element, or `None` to drop it
    fn from_element(element: &Value) -> Option<Self>;
}

fn non_blank<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Character suggestion that passed shape and length checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedRecord {
    /// Trimmed, non-empty, at most 280 characters
    pub name: String,
    /// Trimmed, non-empty, at most 280 characters
    pub summary: String,
}

impl ValidatedRecord {
    /// Create record
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: summary.into(),
        }
    }
}

impl Candidate for ValidatedRecord {
    const KIND: &'static str = "character";

    fn from_element(element: &Value) -> Option<Self> {
        let object = element.as_object()?;
        let name = non_blank(object, "name")?;
        let summary = non_blank(object, "summary")?;
        let (name, _) = truncate_chars(name, SUGGESTION_SUMMARY_CAP);
        let (summary, _) = truncate_chars(summary, SUGGESTION_SUMMARY_CAP);
        Some(Self::new(name, summary))
    }
}

/// Story direction offered by the `generate` task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryIdea {
    /// The proposed summary
    pub summary: String,
    /// Sub-genre and tone label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
}

impl Candidate for StoryIdea {
    const KIND: &'static str = "idea";

    fn from_element(element: &Value) -> Option<Self> {
        let object = element.as_object()?;
        let summary = non_blank(object, "summary")?;
        Some(Self {
            summary: summary.to_string(),
            angle: non_blank(object, "angle").map(str::to_string),
        })
    }
}

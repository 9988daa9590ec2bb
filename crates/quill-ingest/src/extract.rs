//! Two-stage JSON extraction

use crate::error::IngestFailure;
use crate::preview::Preview;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

// Opening fence, optional language tag, body, closing fence
static FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:[A-Za-z][\w+-]*\s|json)?\s*(.*?)\s*```")
        .unwrap_or_else(|err| unreachable!("fence pattern is valid: {err}"))
});

/// Remove fenced code-block markers, keeping their contents
///
/// One pass over the whole text; the result is trimmed.
#[must_use]
pub fn strip_fences(raw: &str) -> String {
    FENCE.replace_all(raw, "${1}").trim().to_string()
}

/// Parse `raw` as JSON, retrying once with code fences stripped
///
/// # Errors
/// `IngestFailure::ParseFailure` if `raw` is blank or neither attempt parses
pub fn extract(raw: &str) -> Result<Value, IngestFailure> {
    if raw.trim().is_empty() {
        return Err(IngestFailure::ParseFailure(Preview::of(raw)));
    }

    match serde_json::from_str(raw) {
        Ok(value) => Ok(value),
        Err(first) => {
            tracing::debug!(error = %first, "direct parse failed, retrying without fences");
            let cleaned = strip_fences(raw);
            serde_json::from_str(&cleaned).map_err(|second| {
                tracing::warn!(error = %second, "response is not JSON");
                IngestFailure::ParseFailure(Preview::of(raw))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_json_parses() {
        let value = extract(r#"[{"name":"Ava","summary":"A pilot."}]"#).unwrap();
        assert_eq!(value, json!([{"name": "Ava", "summary": "A pilot."}]));
    }

    #[test]
    fn json_fence_is_stripped() {
        let raw = "```json\n[{\"name\":\"Bo\",\"summary\":\"A thief.\"}]\n```";
        let value = extract(raw).unwrap();
        assert_eq!(value, json!([{"name": "Bo", "summary": "A thief."}]));
    }

    #[test]
    fn bare_fence_is_stripped() {
        let value = extract("```\n[1, 2]\n```").unwrap();
        assert_eq!(value, json!([1, 2]));
    }

    #[test]
    fn fence_with_surrounding_prose_still_fails() {
        let raw = "Here you go:\n```json\n[1]\n```\nEnjoy!";
        assert_eq!(strip_fences(raw), "Here you go:\n[1]\nEnjoy!");
        assert!(extract(raw).is_err());
    }

    #[test]
    fn inline_json_tag_is_stripped() {
        assert_eq!(strip_fences("```json[1]```"), "[1]");
    }

    #[test]
    fn not_json_reports_preview() {
        let err = extract("not json at all").unwrap_err();
        assert_eq!(err, IngestFailure::ParseFailure(Preview::of("not json at all")));
        assert_eq!(err.preview().to_string(), "not json at all");
    }

    #[test]
    fn blank_input_is_parse_failure() {
        assert!(matches!(extract("   \n"), Err(IngestFailure::ParseFailure(_))));
    }
}

//! Bounded previews of raw model output

use serde::Serialize;
use std::fmt;

/// Characters of raw text kept in a preview
pub const PREVIEW_CHARS: usize = 500;

/// First `max` characters of `text`, and whether anything was cut
///
/// Counts `char`s, so multi-byte text is never split mid-character.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Leading slice of a raw response, shown to the user on failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    text: String,
    truncated: bool,
}

impl Preview {
    /// Preview of `raw`
    #[must_use]
    pub fn of(raw: &str) -> Self {
        let (head, truncated) = truncate_chars(raw, PREVIEW_CHARS);
        Self {
            text: head.to_string(),
            truncated,
        }
    }

    /// Kept characters, without the ellipsis
    #[inline]
    #[must_use]
    pub fn head(&self) -> &str {
        &self.text
    }

    /// True if the raw text was longer than the preview
    #[inline]
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl fmt::Display for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)?;
        if self.truncated {
            f.write_str("...")?;
        }
        Ok(())
    }
}

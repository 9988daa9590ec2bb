//! Input validation errors

use std::fmt;

/// Character field named in validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The `name` field
    Name,
    /// The `summary` field
    Summary,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => f.write_str("name"),
            Self::Summary => f.write_str("summary"),
        }
    }
}

/// Caller input rejected before any storage call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Required field is empty after trimming
    #[error("{0} is required")]
    Missing(Field),

    /// Summary exceeds the interactive cap
    #[error("summary must be {max} characters or less (got {len})")]
    SummaryTooLong {
        /// Length in characters
        len: usize,
        /// Allowed maximum
        max: usize,
    },
}

impl InputError {
    /// Message suitable for an inline form error
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Missing(_) => "Both name and summary are required.".to_string(),
            Self::SummaryTooLong { max, .. } => {
                format!("Summary must be {max} characters or less.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_error_display() {
        assert_eq!(InputError::Missing(Field::Name).to_string(), "name is required");
        let err = InputError::SummaryTooLong { len: 300, max: 280 };
        assert_eq!(
            err.to_string(),
            "summary must be 280 characters or less (got 300)"
        );
    }

    #[test]
    fn user_messages() {
        assert_eq!(
            InputError::Missing(Field::Summary).user_message(),
            "Both name and summary are required."
        );
        assert_eq!(
            InputError::SummaryTooLong { len: 281, max: 280 }.user_message(),
            "Summary must be 280 characters or less."
        );
    }
}

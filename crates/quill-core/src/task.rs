//! Assistant tasks

use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the user asked the assistant to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    /// Propose alternative versions of the current step
    Generate,
    /// Advice and prompts for the current step
    Brainstorm,
    /// Tighten the text the user wrote
    Refine,
    /// Propose characters grounded in steps 1 and 2
    SuggestCharacters,
}

/// Shape of the response a task expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// Free-form markdown, shown as is
    Markdown,
    /// JSON array of `{summary, angle}`
    Ideas,
    /// JSON array of `{name, summary}`
    Characters,
}

impl Task {
    /// Every task, in menu order
    pub const ALL: [Self; 4] = [
        Self::Generate,
        Self::Brainstorm,
        Self::Refine,
        Self::SuggestCharacters,
    ];

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generate => "generate",
            Self::Brainstorm => "brainstorm",
            Self::Refine => "refine",
            Self::SuggestCharacters => "suggest-characters",
        }
    }

    /// Response shape, given whether the caller supplied its own query
    #[must_use]
    pub fn expectation(self, has_override: bool) -> Expectation {
        match self {
            Self::SuggestCharacters => Expectation::Characters,
            Self::Generate => Expectation::Ideas,
            Self::Brainstorm | Self::Refine if has_override => Expectation::Ideas,
            Self::Brainstorm | Self::Refine => Expectation::Markdown,
        }
    }

    /// True if the task works on the text of the current step
    #[must_use]
    pub fn requires_step_text(self) -> bool {
        matches!(self, Self::Generate | Self::Refine)
    }

    /// Status line while the request is in flight
    #[must_use]
    pub fn progress_message(self) -> &'static str {
        match self {
            Self::Generate => "Generating suggestions...",
            Self::Brainstorm => "Fetching advice...",
            Self::Refine => "Refining your text...",
            Self::SuggestCharacters => "Suggesting characters...",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|task| task.as_str() == s.trim())
            .ok_or_else(|| TaskError::UnknownTask(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_names_round_trip() {
        for task in Task::ALL {
            assert_eq!(task.as_str().parse::<Task>().unwrap(), task);
        }
        assert!(matches!("outline".parse::<Task>(), Err(TaskError::UnknownTask(_))));
    }

    #[test]
    fn expectation_classification() {
        assert_eq!(Task::Generate.expectation(false), Expectation::Ideas);
        assert_eq!(Task::Brainstorm.expectation(false), Expectation::Markdown);
        assert_eq!(Task::Refine.expectation(false), Expectation::Markdown);
        assert_eq!(Task::Refine.expectation(true), Expectation::Ideas);
        assert_eq!(Task::SuggestCharacters.expectation(true), Expectation::Characters);
    }

    #[test]
    fn step_text_requirement() {
        assert!(Task::Generate.requires_step_text());
        assert!(Task::Refine.requires_step_text());
        assert!(!Task::Brainstorm.requires_step_text());
        assert!(!Task::SuggestCharacters.requires_step_text());
    }
}

//! Core errors

use crate::task::Task;
use quill_mutation::MutationError;
use quill_provider::ProviderError;
use quill_storage::StoreError;

/// Task could not be turned into a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// `generate`/`refine` on a blank step without an explicit query
    #[error("current step has no text")]
    EmptyStepText,

    /// Task has no prompt for this step
    #[error("{task} is not available on step {step}")]
    UnsupportedStep {
        /// Requested task
        task: Task,
        /// Current step
        step: u8,
    },

    /// Step number outside the method
    #[error("there is no step {0}")]
    UnknownStep(u8),

    /// Unrecognised task name
    #[error("unknown task: {0}")]
    UnknownTask(String),
}

impl TaskError {
    /// Message suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyStepText => "Please enter some text in the text area first.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Assistant error
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Request could not be built
    #[error(transparent)]
    Task(#[from] TaskError),

    /// Model call failed or returned no content
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Character mutation failed
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// Step or snapshot storage failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl AssistantError {
    /// Message suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Task(err) => err.user_message(),
            Self::Provider(err) => err.user_message(),
            Self::Mutation(err) => err.user_message(),
            Self::Store(err) => format!("An error occurred: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_step_message() {
        let err = AssistantError::from(TaskError::EmptyStepText);
        assert_eq!(err.user_message(), "Please enter some text in the text area first.");
    }

    #[test]
    fn unsupported_step_display() {
        let err = TaskError::UnsupportedStep {
            task: Task::Refine,
            step: 3,
        };
        assert_eq!(err.to_string(), "refine is not available on step 3");
    }

    #[test]
    fn provider_message_passes_through() {
        let err = AssistantError::from(ProviderError::empty_response());
        assert_eq!(
            err.user_message(),
            "An error occurred: Received an empty response from the AI."
        );
    }
}

//! Assistant orchestrator
//!
//! Runs model tasks against the story, routes the raw response through
//! ingestion, and adopts suggested characters through the mutation engine.

use crate::error::AssistantError;
use crate::prompt;
use crate::story::StoryState;
use crate::task::{Expectation, Task};
use quill_entity::{Character, CharacterDraft, CharacterUpdate, EntityId};
use quill_ingest::{clamp_for_adoption, ingest, IngestFailure, StoryIdea, ValidatedRecord};
use quill_mutation::{MutationEngine, MutationError};
use quill_provider::{ModelProvider, DEFAULT_MODEL};
use quill_storage::DurableStore;
use std::fmt::Write as _;
use std::sync::Arc;

/// Result of a task that reached the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Free-form reply
    Markdown(String),
    /// Story directions from `generate`
    Ideas(Vec<StoryIdea>),
    /// Character suggestions ready for adoption
    Characters(Vec<ValidatedRecord>),
    /// Reply did not have the expected shape
    Unexpected(IngestFailure),
}

impl TaskOutcome {
    /// Render for display
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Markdown(text) => out.push_str(text),
            Self::Ideas(ideas) => {
                for (n, idea) in ideas.iter().enumerate() {
                    match &idea.angle {
                        Some(angle) => {
                            let _ = writeln!(out, "{}. **{angle}**: {}", n + 1, idea.summary);
                        }
                        None => {
                            let _ = writeln!(out, "{}. {}", n + 1, idea.summary);
                        }
                    }
                }
            }
            Self::Characters(records) => {
                for record in records {
                    let _ = writeln!(out, "- **{}**: {}", record.name, record.summary);
                }
            }
            Self::Unexpected(failure) => out.push_str(&failure.user_message()),
        }
        out
    }
}

/// One suggestion that could not be adopted
#[derive(Debug)]
pub struct AdoptionFailure {
    /// Suggested name
    pub name: String,
    /// Why creation failed
    pub error: MutationError,
}

/// Outcome of adopting a batch of suggestions
#[derive(Debug, Default)]
pub struct AdoptionReport {
    /// Created characters, in input order
    pub added: Vec<Character>,
    /// Suggestions that failed, in input order
    pub failed: Vec<AdoptionFailure>,
}

impl AdoptionReport {
    /// True if at least one character was created
    #[inline]
    #[must_use]
    pub fn any_added(&self) -> bool {
        !self.added.is_empty()
    }

    /// Message suitable for showing to the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match (self.added.len(), self.failed.len()) {
            (0, _) => "Failed to add selected characters. Please try again.".to_string(),
            (1, 0) => "Added 1 character.".to_string(),
            (added, 0) => format!("Added {added} characters."),
            (added, failed) => format!("Added {added} of {} characters.", added + failed),
        }
    }
}

/// Runs assistant tasks and owns the character workflow
pub struct Assistant<S: DurableStore, P: ModelProvider> {
    engine: Arc<MutationEngine<S>>,
    provider: P,
    model: String,
}

impl<S: DurableStore, P: ModelProvider> std::fmt::Debug for Assistant<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("engine", &self.engine)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl<S: DurableStore, P: ModelProvider> Assistant<S, P> {
    /// Create assistant using the default model
    #[must_use]
    pub fn new(engine: Arc<MutationEngine<S>>, provider: P) -> Self {
        Self {
            engine,
            provider,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// With model identifier
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Character engine
    #[inline]
    #[must_use]
    pub fn engine(&self) -> &Arc<MutationEngine<S>> {
        &self.engine
    }

    /// Model identifier sent with requests
    #[inline]
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run `task` against the current story
    ///
    /// A reply of the wrong shape is not an error: it comes back as
    /// [`TaskOutcome::Unexpected`] with a preview of the raw text.
    ///
    /// # Errors
    /// - `AssistantError::Task` before any provider call if the request
    ///   cannot be built
    /// - `AssistantError::Provider` if the call fails or the reply is empty
    pub async fn run_task(
        &self,
        task: Task,
        story: &StoryState,
        override_query: Option<&str>,
    ) -> Result<TaskOutcome, AssistantError> {
        let request = prompt::build_request(&self.model, task, story, override_query)?;
        let has_override = override_query.is_some_and(|q| !q.trim().is_empty());

        tracing::info!(task = %task, step = story.current_step(), "{}", task.progress_message());
        let response = self.provider.complete(request).await.map_err(|err| {
            tracing::error!(task = %task, error = %err, "model call failed");
            err
        })?;
        let text = response.content()?;

        let outcome = match task.expectation(has_override) {
            Expectation::Markdown => TaskOutcome::Markdown(text.to_string()),
            Expectation::Ideas => match ingest::<StoryIdea>(text) {
                Ok(ideas) => TaskOutcome::Ideas(ideas),
                Err(failure) => TaskOutcome::Unexpected(failure),
            },
            Expectation::Characters => match ingest::<ValidatedRecord>(text) {
                Ok(records) => TaskOutcome::Characters(records),
                Err(failure) => TaskOutcome::Unexpected(failure),
            },
        };
        Ok(outcome)
    }

    /// Create each suggestion in order
    ///
    /// Summaries are clamped for adoption first. A failed suggestion is
    /// recorded and the batch continues.
    pub async fn adopt_characters(&self, records: &[ValidatedRecord]) -> AdoptionReport {
        let mut report = AdoptionReport::default();

        for record in records {
            match self.engine.create(clamp_for_adoption(record)).await {
                Ok(character) => report.added.push(character),
                Err(error) => {
                    tracing::error!(name = %record.name, error = %error, "failed to adopt character");
                    report.failed.push(AdoptionFailure {
                        name: record.name.clone(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            added = report.added.len(),
            failed = report.failed.len(),
            "character adoption finished"
        );
        report
    }

    /// Create a character typed in by the user
    ///
    /// # Errors
    /// - `AssistantError::Mutation` wrapping `MutationError::Invalid` for
    ///   blank fields or a summary over 280 characters
    /// - `AssistantError::Mutation` if persistence fails
    pub async fn add_character(&self, draft: &CharacterDraft) -> Result<Character, AssistantError> {
        let input = draft.validate().map_err(MutationError::from)?;
        Ok(self.engine.create(input).await?)
    }

    /// Replace a character with edited form input
    ///
    /// The draft goes through the same checks as [`Self::add_character`]
    /// before the engine sees it.
    ///
    /// # Errors
    /// - `AssistantError::Mutation` wrapping `MutationError::Invalid` for
    ///   blank fields or a summary over 280 characters
    /// - `AssistantError::Mutation` for an absent or still-pending id, or if
    ///   persistence fails
    pub async fn edit_character(
        &self,
        id: impl Into<EntityId>,
        draft: &CharacterDraft,
    ) -> Result<Character, AssistantError> {
        let input = draft.validate().map_err(MutationError::from)?;
        let update = CharacterUpdate::new(id, input.name, input.summary);
        Ok(self.engine.update(update).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use quill_ingest::Preview;
    use quill_provider::{ChatRequest, ChatResponse, ProviderError};
    use quill_storage::MemoryStore;

    mock! {
        pub Provider {}

        #[async_trait]
        impl ModelProvider for Provider {
            async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
        }
    }

    fn assistant(provider: MockProvider) -> Assistant<MemoryStore, MockProvider> {
        let engine = Arc::new(MutationEngine::new(Arc::new(MemoryStore::new())));
        Assistant::new(engine, provider)
    }

    fn story_with(step_one: &str) -> StoryState {
        let mut story = StoryState::new();
        story.set_current_text(step_one);
        story
    }

    #[tokio::test]
    async fn empty_step_never_calls_provider() {
        let mut provider = MockProvider::new();
        provider.expect_complete().never();

        let err = assistant(provider)
            .run_task(Task::Generate, &StoryState::new(), None)
            .await
            .unwrap_err();

        assert_eq!(err.user_message(), "Please enter some text in the text area first.");
    }

    #[tokio::test]
    async fn brainstorm_returns_markdown() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .times(1)
            .withf(|request| request.user_prompt().is_some_and(|p| p.contains("one-sentence hook")))
            .returning(|_| Ok(ChatResponse::from_content("## Ideas\n- Try a heist")));

        let outcome = assistant(provider)
            .run_task(Task::Brainstorm, &StoryState::new(), None)
            .await
            .unwrap();

        assert_eq!(outcome, TaskOutcome::Markdown("## Ideas\n- Try a heist".to_string()));
    }

    #[tokio::test]
    async fn generate_parses_ideas() {
        let mut provider = MockProvider::new();
        provider.expect_complete().returning(|_| {
            Ok(ChatResponse::from_content(
                r#"[{"summary":"A pilot steals a moon.","angle":"Space Caper"}]"#,
            ))
        });

        let outcome = assistant(provider)
            .run_task(Task::Generate, &story_with("pilot, moon"), None)
            .await
            .unwrap();

        let TaskOutcome::Ideas(ideas) = outcome else {
            panic!("expected ideas");
        };
        assert_eq!(ideas[0].angle.as_deref(), Some("Space Caper"));
    }

    #[tokio::test]
    async fn unparseable_characters_are_unexpected() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .returning(|_| Ok(ChatResponse::from_content("not json at all")));

        let outcome = assistant(provider)
            .run_task(Task::SuggestCharacters, &StoryState::new(), None)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TaskOutcome::Unexpected(IngestFailure::ParseFailure(Preview::of("not json at all")))
        );
        assert!(outcome.to_markdown().contains("```\nnot json at all\n```"));
    }

    #[tokio::test]
    async fn empty_provider_content_is_provider_error() {
        let mut provider = MockProvider::new();
        provider
            .expect_complete()
            .returning(|_| Ok(ChatResponse::default()));

        let err = assistant(provider)
            .run_task(Task::SuggestCharacters, &StoryState::new(), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AssistantError::Provider(ProviderError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn add_character_rejects_long_summary_before_engine() {
        let provider = MockProvider::new();
        let assistant = assistant(provider);
        let draft = CharacterDraft::new("Ava", "x".repeat(281));

        let err = assistant.add_character(&draft).await.unwrap_err();

        assert_eq!(err.user_message(), "Summary must be 280 characters or less.");
        assert!(assistant.engine().is_empty());
        assert_eq!(assistant.engine().store().row_count(), 0);
    }

    #[test]
    fn adoption_report_messages() {
        let empty = AdoptionReport::default();
        assert_eq!(
            empty.user_message(),
            "Failed to add selected characters. Please try again."
        );
        assert!(!empty.any_added());
    }
}

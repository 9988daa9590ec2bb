//! Story progress through the Snowflake steps
//!
//! [`StoryState`] is the in-memory view; [`StorySession`] pairs it with the
//! step store and the quick-save slot.

use crate::error::{AssistantError, TaskError};
use quill_entity::{Clock, SystemClock};
use quill_storage::{QuickSnapshot, SnapshotSlot, StepEntry, StepStore};
use std::collections::BTreeMap;
use std::sync::Arc;

/// First step of the method
pub const FIRST_STEP: u8 = 1;

/// Last step of the method (character summaries)
pub const LAST_STEP: u8 = 3;

/// Steps whose text is stored
pub const TEXT_STEPS: [u8; 2] = [1, 2];

/// Human title of a step
#[must_use]
pub fn step_title(step: u8) -> String {
    match step {
        1 => "One-Sentence Summary".to_string(),
        2 => "One-Paragraph Summary".to_string(),
        3 => "Character Summaries".to_string(),
        other => format!("Step {other}"),
    }
}

/// Current step and the text written for each step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryState {
    current_step: u8,
    steps: BTreeMap<String, String>,
}

impl Default for StoryState {
    fn default() -> Self {
        Self {
            current_step: FIRST_STEP,
            steps: BTreeMap::new(),
        }
    }
}

impl StoryState {
    /// Fresh story on step 1
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current step
    #[inline]
    #[must_use]
    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    /// Text of `step`, empty if never written
    #[must_use]
    pub fn step_text(&self, step: u8) -> &str {
        self.steps
            .get(&step.to_string())
            .map_or("", String::as_str)
    }

    /// Text of the current step
    #[must_use]
    pub fn current_text(&self) -> &str {
        self.step_text(self.current_step)
    }

    /// All step texts by step id
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &BTreeMap<String, String> {
        &self.steps
    }

    /// Replace the text of `step`
    pub fn set_step_text(&mut self, step: u8, text: impl Into<String>) {
        self.steps.insert(step.to_string(), text.into());
    }

    /// Replace the text of the current step
    pub fn set_current_text(&mut self, text: impl Into<String>) {
        self.set_step_text(self.current_step, text);
    }

    /// Move to `step`
    ///
    /// Entering step 2 with blank text starts it from the step 1 summary.
    ///
    /// # Errors
    /// `TaskError::UnknownStep` outside `1..=3`
    pub fn enter_step(&mut self, step: u8) -> Result<(), TaskError> {
        if !(FIRST_STEP..=LAST_STEP).contains(&step) {
            return Err(TaskError::UnknownStep(step));
        }
        self.current_step = step;

        if step == 2 && self.step_text(2).trim().is_empty() {
            let first = self.step_text(1).to_string();
            if !first.trim().is_empty() {
                tracing::debug!("step 2 prefilled from step 1");
                self.set_step_text(2, first);
            }
        }
        Ok(())
    }

    /// Snapshot for quick save
    #[must_use]
    pub fn to_snapshot(&self, created_at: i64) -> QuickSnapshot {
        QuickSnapshot::new(self.current_step, self.steps.clone(), created_at)
    }

    /// Restore step texts and current step from a snapshot
    ///
    /// Texts in the snapshot replace existing ones; an out-of-range step
    /// falls back to step 1.
    pub fn apply_snapshot(&mut self, snapshot: &QuickSnapshot) {
        for (id, content) in &snapshot.steps {
            self.steps.insert(id.clone(), content.clone());
        }
        self.current_step = if (FIRST_STEP..=LAST_STEP).contains(&snapshot.current_step) {
            snapshot.current_step
        } else {
            tracing::warn!(step = snapshot.current_step, "snapshot step out of range, using step 1");
            FIRST_STEP
        };
    }
}

/// Story state backed by step storage and a quick-save slot
#[derive(Debug)]
pub struct StorySession<S> {
    store: Arc<S>,
    state: StoryState,
    clock: Arc<dyn Clock>,
}

impl<S: StepStore + SnapshotSlot> StorySession<S> {
    /// Session with an empty story
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: StoryState::new(),
            clock: Arc::new(SystemClock),
        }
    }

    /// With time source
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Current story state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &StoryState {
        &self.state
    }

    /// Mutable story state
    #[inline]
    pub fn state_mut(&mut self) -> &mut StoryState {
        &mut self.state
    }

    /// Load the stored text of steps 1 and 2
    ///
    /// # Errors
    /// `AssistantError::Store` if the step store fails
    pub async fn load_steps(&mut self) -> Result<(), AssistantError> {
        let ids = TEXT_STEPS.map(|step| step.to_string());
        let keys: Vec<&str> = ids.iter().map(String::as_str).collect();

        let entries = self.store.bulk_get(&keys).await?;
        for entry in entries.into_iter().flatten() {
            self.state.steps.insert(entry.id, entry.content);
        }
        tracing::debug!(steps = self.state.steps.len(), "steps loaded");
        Ok(())
    }

    /// Persist the text of `step`
    ///
    /// # Errors
    /// `AssistantError::Store` if the write fails
    pub async fn save_step(&self, step: u8) -> Result<(), AssistantError> {
        let entry = StepEntry::new(step.to_string(), self.state.step_text(step));
        self.store.put(entry).await?;
        tracing::info!(step, "step saved");
        Ok(())
    }

    /// Persist the text of the current step
    ///
    /// # Errors
    /// `AssistantError::Store` if the write fails
    pub async fn save_current(&self) -> Result<(), AssistantError> {
        self.save_step(self.state.current_step).await
    }

    /// Write the whole story to the quick-save slot
    ///
    /// # Errors
    /// `AssistantError::Store` if the slot cannot be written
    pub async fn quick_save(&self) -> Result<QuickSnapshot, AssistantError> {
        let snapshot = self.state.to_snapshot(self.clock.now_millis());
        self.store.save_snapshot(&snapshot).await?;
        tracing::info!(step = snapshot.current_step, "quick state saved");
        Ok(snapshot)
    }

    /// Restore the story from the quick-save slot
    ///
    /// Every restored step is also written to the step store. Returns `None`
    /// if nothing was saved.
    ///
    /// # Errors
    /// `AssistantError::Store` if the slot is unreadable or a step write fails
    pub async fn quick_load(&mut self) -> Result<Option<QuickSnapshot>, AssistantError> {
        let Some(snapshot) = self.store.load_snapshot().await? else {
            tracing::info!("no quick save found");
            return Ok(None);
        };

        self.state.apply_snapshot(&snapshot);
        for (id, content) in &snapshot.steps {
            self.store.put(StepEntry::new(id.clone(), content.clone())).await?;
        }
        tracing::info!(step = self.state.current_step, "quick state loaded");
        Ok(Some(snapshot))
    }
}

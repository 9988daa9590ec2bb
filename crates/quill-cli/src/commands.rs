//! Command handlers
//!
//! Each handler returns the text to print on stdout.

use anyhow::{Context, Result};
use clap::ArgMatches;
use quill_core::{
    AssistantError, Assistant, CharacterDraft, ModelProvider, StoreId,
    StorySession, Task, TaskOutcome,
};
use quill_storage::{DurableStore, SnapshotSlot, StepStore};
use std::fmt::Write as _;
use std::str::FromStr;

/// Attach the user-facing message to an assistant error
fn friendly(err: impl Into<AssistantError>) -> anyhow::Error {
    let err = err.into();
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Assistant and story session over one store
pub(crate) struct App<S: DurableStore, P: ModelProvider> {
    assistant: Assistant<S, P>,
    session: StorySession<S>,
    json: bool,
}

impl<S, P> App<S, P>
where
    S: DurableStore + StepStore + SnapshotSlot,
    P: ModelProvider,
{
    pub(crate) fn new(assistant: Assistant<S, P>, session: StorySession<S>) -> Self {
        Self {
            assistant,
            session,
            json: false,
        }
    }

    pub(crate) fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub(crate) async fn dispatch(&mut self, matches: &ArgMatches) -> Result<String> {
        self.session.load_steps().await.map_err(friendly)?;

        match matches.subcommand() {
            Some(("characters", args)) => self.characters(args).await,
            Some(("ask", args)) => self.ask(args).await,
            Some(("suggest", args)) => self.suggest(args.get_flag("adopt")).await,
            Some(("step", args)) => self.step(args).await,
            Some(("snapshot", args)) => self.snapshot(args).await,
            _ => Ok(String::new()),
        }
    }

    async fn characters(&self, matches: &ArgMatches) -> Result<String> {
        let engine = self.assistant.engine();
        engine.load().await.map_err(friendly)?;

        match matches.subcommand() {
            Some(("list", _)) => {
                let characters = engine.characters();
                if self.json {
                    return serde_json::to_string_pretty(&characters)
                        .context("cannot render characters");
                }
                let mut out = String::new();
                for character in &characters {
                    let _ = writeln!(out, "{}\t{}\t{}", character.id, character.name, character.summary);
                }
                if characters.is_empty() {
                    out.push_str("No characters yet.\n");
                }
                Ok(out)
            }
            Some(("add", args)) => {
                let draft = CharacterDraft::new(text(args, "name"), text(args, "summary"));
                let added = self.assistant.add_character(&draft).await.map_err(friendly)?;
                Ok(format!("Added {} ({})\n", added.name, added.id))
            }
            Some(("edit", args)) => {
                let draft = CharacterDraft::new(text(args, "name"), text(args, "summary"));
                let updated = self
                    .assistant
                    .edit_character(store_id(args), &draft)
                    .await
                    .map_err(friendly)?;
                Ok(format!("Updated {} ({})\n", updated.name, updated.id))
            }
            Some(("remove", args)) => {
                let id = store_id(args);
                engine.delete(id.into()).await.map_err(friendly)?;
                Ok(format!("Removed {id}\n"))
            }
            _ => Ok(String::new()),
        }
    }

    async fn ask(&mut self, matches: &ArgMatches) -> Result<String> {
        let task = Task::from_str(&text(matches, "task")).map_err(friendly)?;
        let step = matches.get_one::<u8>("step").copied().unwrap_or(1);
        let query = matches.get_one::<String>("query").map(String::as_str);

        self.session.state_mut().enter_step(step).map_err(friendly)?;
        let outcome = self
            .assistant
            .run_task(task, self.session.state(), query)
            .await
            .map_err(friendly)?;
        Ok(outcome.to_markdown())
    }

    async fn suggest(&mut self, adopt: bool) -> Result<String> {
        self.session.state_mut().enter_step(3).map_err(friendly)?;
        let outcome = self
            .assistant
            .run_task(Task::SuggestCharacters, self.session.state(), None)
            .await
            .map_err(friendly)?;

        let mut out = outcome.to_markdown();
        if let (true, TaskOutcome::Characters(records)) = (adopt, &outcome) {
            self.assistant.engine().load().await.map_err(friendly)?;
            let report = self.assistant.adopt_characters(records).await;
            let _ = writeln!(out, "\n{}", report.user_message());
        }
        Ok(out)
    }

    async fn step(&mut self, matches: &ArgMatches) -> Result<String> {
        match matches.subcommand() {
            Some(("show", args)) => {
                let step = args.get_one::<u8>("step").copied().unwrap_or(1);
                self.session.state_mut().enter_step(step).map_err(friendly)?;
                Ok(format!("{}\n", self.session.state().current_text()))
            }
            Some(("set", args)) => {
                let step = args.get_one::<u8>("step").copied().unwrap_or(1);
                self.session.state_mut().enter_step(step).map_err(friendly)?;
                self.session.state_mut().set_current_text(text(args, "text"));
                self.session.save_current().await.map_err(friendly)?;
                Ok(format!("Saved step {step}\n"))
            }
            _ => Ok(String::new()),
        }
    }

    async fn snapshot(&mut self, matches: &ArgMatches) -> Result<String> {
        match matches.subcommand() {
            Some(("save", args)) => {
                let step = args.get_one::<u8>("step").copied().unwrap_or(1);
                self.session.state_mut().enter_step(step).map_err(friendly)?;
                let snapshot = self.session.quick_save().await.map_err(friendly)?;
                Ok(format!(
                    "Quick saved {} step(s) on step {}\n",
                    snapshot.steps.len(),
                    snapshot.current_step
                ))
            }
            Some(("load", _)) => match self.session.quick_load().await.map_err(friendly)? {
                Some(snapshot) => Ok(format!(
                    "Quick loaded {} step(s), now on step {}\n",
                    snapshot.steps.len(),
                    self.session.state().current_step()
                )),
                None => Ok("No quick save found.\n".to_string()),
            },
            _ => Ok(String::new()),
        }
    }
}

fn text(matches: &ArgMatches, id: &str) -> String {
    matches.get_one::<String>(id).cloned().unwrap_or_default()
}

fn store_id(matches: &ArgMatches) -> StoreId {
    StoreId(matches.get_one::<u64>("id").copied().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli;
    use pretty_assertions::assert_eq;
    use quill_core::MutationEngine;
    use quill_storage::MemoryStore;
    use quill_test_utils::{stored, ScriptedProvider};
    use std::sync::Arc;

    fn app(store: MemoryStore, provider: ScriptedProvider) -> App<MemoryStore, ScriptedProvider> {
        let store = Arc::new(store);
        let engine = Arc::new(MutationEngine::new(Arc::clone(&store)));
        App::new(Assistant::new(engine, provider), StorySession::new(store))
    }

    async fn run(app: &mut App<MemoryStore, ScriptedProvider>, args: &[&str]) -> Result<String> {
        let matches = cli::build().try_get_matches_from(args)?;
        app.dispatch(&matches).await
    }

    #[tokio::test]
    async fn list_shows_stored_rows() {
        let store = MemoryStore::with_rows([stored(4, "Ava", "A pilot.")]);
        let mut app = app(store, ScriptedProvider::new());

        let out = run(&mut app, &["quill", "characters", "list"]).await.unwrap();

        assert_eq!(out, "4\tAva\tA pilot.\n");
    }

    #[tokio::test]
    async fn add_then_remove() {
        let mut app = app(MemoryStore::new(), ScriptedProvider::new());

        let added = run(&mut app, &["quill", "characters", "add", "--name", "Bo", "--summary", "A thief."])
            .await
            .unwrap();
        assert_eq!(added, "Added Bo (1)\n");

        let removed = run(&mut app, &["quill", "characters", "remove", "1"]).await.unwrap();
        assert_eq!(removed, "Removed 1\n");
        assert!(app.assistant.engine().is_empty());
    }

    #[tokio::test]
    async fn edit_missing_character_reports_not_found() {
        let mut app = app(MemoryStore::new(), ScriptedProvider::new());

        let err = run(
            &mut app,
            &["quill", "characters", "edit", "9", "--name", "X", "--summary", "Y"],
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "That character no longer exists.");
    }

    #[tokio::test]
    async fn edit_trims_and_rejects_long_summary() {
        let store = MemoryStore::with_rows([stored(1, "Ava", "A pilot.")]);
        let mut app = app(store, ScriptedProvider::new());
        let long = "x".repeat(400);

        let err = run(
            &mut app,
            &["quill", "characters", "edit", "1", "--name", "  Ava  ", "--summary", long.as_str()],
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Summary must be 280 characters or less.");
        assert_eq!(app.assistant.engine().store().row(StoreId(1)).unwrap().record.summary, "A pilot.");

        let out = run(
            &mut app,
            &["quill", "characters", "edit", "1", "--name", "  Ava  ", "--summary", " A captain. "],
        )
        .await
        .unwrap();
        assert_eq!(out, "Updated Ava (1)\n");
        let row = app.assistant.engine().store().row(StoreId(1)).unwrap();
        assert_eq!(row.record.name, "Ava");
        assert_eq!(row.record.summary, "A captain.");
    }

    #[tokio::test]
    async fn ask_on_blank_step_stops_before_provider() {
        let mut app = app(MemoryStore::new(), ScriptedProvider::new());

        let err = run(&mut app, &["quill", "ask", "refine"]).await.unwrap_err();

        assert_eq!(err.to_string(), "Please enter some text in the text area first.");
    }

    #[tokio::test]
    async fn suggest_and_adopt() {
        let reply = r#"[{"name":"Mara","summary":"The keeper."}]"#;
        let mut app = app(MemoryStore::new(), ScriptedProvider::new().reply(reply));
        run(&mut app, &["quill", "step", "set", "A keeper finds a door."]).await.unwrap();

        let out = run(&mut app, &["quill", "suggest", "--adopt"]).await.unwrap();

        assert!(out.contains("- **Mara**: The keeper."));
        assert!(out.ends_with("Added 1 character.\n"));
        assert_eq!(app.assistant.engine().len(), 1);
    }

    #[tokio::test]
    async fn step_set_then_snapshot_round_trip() {
        let mut app = app(MemoryStore::new(), ScriptedProvider::new());
        run(&mut app, &["quill", "step", "set", "Hook."]).await.unwrap();

        let shown = run(&mut app, &["quill", "step", "show", "--step", "2"]).await.unwrap();
        assert_eq!(shown, "Hook.\n");

        let saved = run(&mut app, &["quill", "snapshot", "save", "--step", "2"]).await.unwrap();
        assert_eq!(saved, "Quick saved 2 step(s) on step 2\n");

        let loaded = run(&mut app, &["quill", "snapshot", "load"]).await.unwrap();
        assert_eq!(loaded, "Quick loaded 2 step(s), now on step 2\n");
    }
}

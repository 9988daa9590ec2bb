//! `quill` binary

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use commands::App;
use quill_core::{Assistant, HttpProvider, JsonFileStore, MutationEngine, QuillConfig, StorySession};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build().get_matches();
    let json = matches.get_flag("json");
    logging::init(json);

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => QuillConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => QuillConfig::new(),
    }
    .with_env_overrides();
    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config.storage.data_dir = dir.clone();
    }
    tracing::debug!(data_dir = %config.storage.data_dir.display(), model = %config.provider.model, "configuration resolved");

    let store = Arc::new(
        JsonFileStore::open(config.storage.data_dir.clone())
            .await
            .with_context(|| format!("opening {}", config.storage.data_dir.display()))?,
    );
    let provider = HttpProvider::new(&config.provider).context("building HTTP client")?;
    let engine = Arc::new(MutationEngine::with_config(
        Arc::clone(&store),
        config.engine.clone(),
    ));

    let assistant = Assistant::new(engine, provider).with_model(config.provider.model.clone());
    let mut app = App::new(assistant, StorySession::new(store)).with_json(json);

    let out = app.dispatch(&matches).await?;
    print!("{out}");
    Ok(())
}

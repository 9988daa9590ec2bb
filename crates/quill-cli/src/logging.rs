//! Subscriber setup

use tracing_subscriber::EnvFilter;

/// Variable holding the log filter
pub(crate) const LOG_ENV: &str = "QUILL_LOG";

/// Install the global subscriber writing to stderr
///
/// Filter comes from `QUILL_LOG` and defaults to `info`.
pub(crate) fn init(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = installed {
        eprintln!("logging already initialised: {err}");
    }
}

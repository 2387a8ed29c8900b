//! Binary entry point that glues the JSON-backed library to the TUI: resolve
//! paths, start file logging, load the collection, and drive the Ratatui event
//! loop until the user exits.
use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use bookshelf::config::LOG_FILTER_VAR;
use bookshelf::{run_app, App, Config, Library};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Returning a `Result` bubbles up fatal initialization problems (for example
/// an unreadable home directory) to the terminal instead of crashing silently.
fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_logging(&config)?;
    info!(path = %config.library_path.display(), "starting bookshelf");

    let mut app = match Library::open(&config.library_path) {
        Ok(library) => App::new(library),
        Err(err) => {
            warn!(error = %err, "falling back to an empty library");
            let mut app = App::new(Library::empty(&config.library_path));
            app.report_load_failure(&err);
            app
        }
    };

    let result = run_app(&mut app);
    info!(books = app.library().len(), "bookshelf closed");
    result
}

/// Send `tracing` output to the log file; the terminal is owned by the UI.
fn init_logging(config: &Config) -> Result<()> {
    if let Some(parent) = config.log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("failed to create data directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("failed to open log file {}", config.log_path.display()))?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

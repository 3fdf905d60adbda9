use crate::config;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::PathBuf;

const LOG_FILE: &str = "mediacenter-tui.log";

pub fn log_path() -> Result<PathBuf> {
    config::scoped_path(LOG_FILE)
}

/// Logs to stderr; used by the one-shot subcommands.
pub fn init_cli() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "warn"),
    )
    .try_init();
}

/// Logs to a file so output never lands on the alternate screen.
pub fn init_tui() -> Result<PathBuf> {
    let path = log_path()?;
    config::ensure_parent_dir(&path)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed opening log file {}", path.display()))?;

    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    )
    .target(env_logger::Target::Pipe(Box::new(file)))
    .try_init();
    Ok(path)
}

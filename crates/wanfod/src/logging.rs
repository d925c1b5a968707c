//! Log output: stdout always, plus an optional plain-text log file

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Must be held for the life of the daemon; dropping it flushes the file writer
pub struct LogGuard {
    _guard: Option<WorkerGuard>,
}

/// Map a configured level name to a tracing level (unknown names fall back to info)
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber
pub fn init(level: &str, log_file: Option<&Path>) -> Result<LogGuard> {
    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(parse_level(level)))
        .with(fmt::layer().with_writer(io::stdout))
        .with(file_layer)
        .try_init()
        .context("Failed to set tracing subscriber")?;

    Ok(LogGuard { _guard: guard })
}

/// Open `path` for appending (creating its directory) behind a background writer
fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok(tracing_appender::non_blocking(file))
}

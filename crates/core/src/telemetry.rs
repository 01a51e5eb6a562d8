//! Logging setup.
//!
//! The TUI owns the terminal, so interactive sessions log to a file; one-shot
//! CLI commands log to stderr.

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::OnceLock;
use tracing::subscriber::SetGlobalDefaultError;
use tracing::Subscriber;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter. Falls back to `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "FLEET_LOG";

static TELEMETRY_GUARD: OnceLock<()> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to this file, creating parent directories as needed.
    File(PathBuf),
}

/// Returned once logging is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TelemetryHandle;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Install the global subscriber on first call; later calls do nothing.
///
/// The filter comes from `FLEET_LOG`, then `RUST_LOG`, then `default_level`.
pub fn init(target: LogTarget, default_level: &str) -> Result<TelemetryHandle, TelemetryError> {
    if TELEMETRY_GUARD.get().is_some() {
        return Ok(TelemetryHandle);
    }
    install_subscriber(&target, default_level)?;
    // A concurrent caller may have won; either way a subscriber is installed.
    let _ = TELEMETRY_GUARD.set(());
    tracing::debug!(?target, "Telemetry initialised");
    Ok(TelemetryHandle)
}

fn filter_expression(default_level: &str) -> String {
    [LOG_ENV_VAR, "RUST_LOG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default_level.to_string())
}

fn install_subscriber(target: &LogTarget, default_level: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(filter_expression(default_level))
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false);

    let subscriber: Box<dyn Subscriber + Send + Sync> = match target {
        LogTarget::Stderr => Box::new(
            builder
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .compact()
                .finish(),
        ),
        LogTarget::File(path) => {
            let log_file_error = |source| TelemetryError::LogFile {
                path: path.clone(),
                source,
            };
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(log_file_error)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(log_file_error)?;
            Box::new(builder.with_writer(Mutex::new(file)).with_ansi(false).finish())
        }
    };

    tracing::subscriber::set_global_default(subscriber).map_err(TelemetryError::Subscriber)
}

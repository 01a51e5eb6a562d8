//! Settings model for `config.toml`.
//!
//! Every field has a default, so a missing file or a partial file is valid.

use serde::Deserialize;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Name of the per-user directory holding settings, the project store and logs.
pub const APP_DIR_NAME: &str = "fleet-monitor";

/// Application settings.
///
/// # Example
///
/// ```toml
/// # ~/.config/fleet-monitor/config.toml
/// supervisor_binary = "pm2"
/// command_timeout_secs = 15
/// probe_timeout_secs = 10
/// poll_interval_secs = 5
/// log_lines = 200
/// log_level = "info"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Executable used for every supervisor command.
    pub supervisor_binary: String,

    /// Hard limit for a single supervisor command.
    pub command_timeout_secs: u64,

    /// Hard limit for one process-table inspection.
    pub probe_timeout_secs: u64,

    /// Interval between refreshes while the daemon is running.
    pub poll_interval_secs: u64,

    /// Number of historical log lines fetched per process.
    pub log_lines: u32,

    /// Location of the declared-configuration store.
    ///
    /// Defaults to `projects.json` beside `config.toml`.
    pub projects_file: Option<PathBuf>,

    /// Default tracing filter when `FLEET_LOG`/`RUST_LOG` are unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            supervisor_binary: "pm2".to_string(),
            command_timeout_secs: 15,
            probe_timeout_secs: 10,
            poll_interval_secs: 5,
            log_lines: 200,
            projects_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Resolved location of the project store.
    pub fn projects_path(&self) -> PathBuf {
        self.projects_file
            .clone()
            .unwrap_or_else(|| app_config_dir().join("projects.json"))
    }
}

/// Per-user configuration directory for this application.
///
/// Falls back to the home directory, then the working directory, on
/// platforms without a configuration directory.
pub fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Per-user data directory, used for the TUI log file.
pub fn app_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

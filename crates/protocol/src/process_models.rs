//! Runtime process models.
//!
//! This module defines the live records reported by the supervisor and the
//! merged view that overlays them on declared configurations.

use chrono::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::config_models::DeclaredProcessConfig;

/// Lifecycle status of a supervised process.
///
/// The first six variants are reported by the supervisor. `Undeployed` is
/// never reported: it marks a declared process with no live counterpart.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "kebab-case")]
pub enum ProcessStatus {
    Online,
    Launching,
    Stopping,
    Stopped,
    Errored,
    OneLaunchStatus,
    Undeployed,
    /// Any status string this build does not recognize.
    #[serde(other)]
    Unknown,
}

impl ProcessStatus {
    /// Stopped and stopping are grouped together on the dashboard.
    pub fn is_stopped(self) -> bool {
        matches!(self, Self::Stopped | Self::Stopping)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Online => "online",
            Self::Launching => "launching",
            Self::Stopping => "stopping",
            Self::Stopped => "stopped",
            Self::Errored => "errored",
            Self::OneLaunchStatus => "one-launch-status",
            Self::Undeployed => "undeployed",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Resource usage sampled by the supervisor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, TS)]
pub struct Monitoring {
    pub cpu_percent: f64,
    pub memory_bytes: u64,
}

/// One process as reported by a single supervisor snapshot.
///
/// Records are produced fresh on every successful query and never persisted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct LiveProcessRecord {
    pub name: String,

    /// Daemon-assigned identifier, usable wherever a name is accepted.
    pub id: u32,

    /// OS pid, absent for processes that are not running.
    pub pid: Option<u32>,

    pub status: ProcessStatus,

    pub restart_count: u32,

    /// Instant the current incarnation came online.
    pub uptime_start: Option<DateTime<Utc>>,

    pub monitoring: Monitoring,

    /// Configured restart threshold in bytes, as the daemon understood it.
    pub max_memory_bytes: Option<u64>,

    pub out_log_path: Option<String>,

    pub err_log_path: Option<String>,
}

/// A declared configuration merged with its live counterpart, if any.
///
/// Live fields take precedence over declared ones where both describe the
/// same thing (log paths, memory threshold).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct MergedProjectView {
    pub config: DeclaredProcessConfig,
    pub live: Option<LiveProcessRecord>,
}

impl MergedProjectView {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Live status, or `Undeployed` when the supervisor does not know the name.
    pub fn status(&self) -> ProcessStatus {
        self.live
            .as_ref()
            .map_or(ProcessStatus::Undeployed, |live| live.status)
    }

    /// Whether the supervisor currently manages this process.
    pub fn is_deployed(&self) -> bool {
        self.live.is_some()
    }

    pub fn out_log_path(&self) -> Option<&str> {
        self.live
            .as_ref()
            .and_then(|live| live.out_log_path.as_deref())
            .or(self.config.out_file.as_deref())
    }

    pub fn err_log_path(&self) -> Option<&str> {
        self.live
            .as_ref()
            .and_then(|live| live.err_log_path.as_deref())
            .or(self.config.error_file.as_deref())
    }
}

/// Aggregate figures for the dashboard.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, TS)]
pub struct FleetSummary {
    pub total: usize,
    pub online: usize,
    pub stopped: usize,
    pub errored: usize,
    pub undeployed: usize,
    /// Sum over online processes only.
    pub cpu_percent: f64,
    /// Sum over online processes only.
    pub memory_bytes: u64,
}

impl FleetSummary {
    pub fn from_views(views: &[MergedProjectView]) -> Self {
        let mut summary = Self {
            total: views.len(),
            ..Self::default()
        };
        for view in views {
            match view.status() {
                ProcessStatus::Online => {
                    summary.online += 1;
                    if let Some(live) = &view.live {
                        summary.cpu_percent += live.monitoring.cpu_percent;
                        summary.memory_bytes += live.monitoring.memory_bytes;
                    }
                }
                ProcessStatus::Stopped | ProcessStatus::Stopping => summary.stopped += 1,
                ProcessStatus::Errored => summary.errored += 1,
                ProcessStatus::Undeployed => summary.undeployed += 1,
                _ => {}
            }
        }
        summary
    }
}

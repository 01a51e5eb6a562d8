//! Supervisor daemon state.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// What the control thread currently believes about the supervisor daemon.
///
/// `Pending` is asserted locally while a liveness answer is outstanding. It is
/// never authoritative: the next liveness result replaces it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DaemonState {
    Stopped,
    Running,
    Pending,
}

impl DaemonState {
    /// Map an authoritative liveness answer onto a state.
    pub fn from_liveness(running: bool) -> Self {
        if running {
            Self::Running
        } else {
            Self::Stopped
        }
    }
}

impl fmt::Display for DaemonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("stopped"),
            Self::Running => f.write_str("running"),
            Self::Pending => f.write_str("pending"),
        }
    }
}

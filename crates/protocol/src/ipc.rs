//! Control-thread/worker communication protocol.
//!
//! This module defines the message types exchanged between the control
//! thread (which owns UI state) and the worker (which talks to the
//! supervisor).
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Requests sent from the control thread to the worker
//! - `Event`: One-way result notifications sent from the worker back
//!
//! The worker handles operations strictly in the order received, so events
//! arrive in issuance order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config_models::DeclaredProcessConfig;
use crate::process_models::LiveProcessRecord;

/// Operations sent from the control thread to the worker.
///
/// Process targets are names or daemon-assigned ids, as the supervisor
/// accepts either.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "stopProcess",
///   "payload": { "target": "api" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Probe liveness and, if the daemon is up, fetch the live list.
    RefreshList,

    /// Fetch a bounded tail of historical log output for one process.
    FetchLogs { target: String },

    /// Start a declared process through a one-shot descriptor.
    StartProcess { config: DeclaredProcessConfig },

    StopProcess { target: String },

    RestartProcess { target: String },

    ReloadProcess { target: String },

    /// Remove a process from the supervisor's management list.
    DeleteProcess { target: String },

    StopAll,

    RestartAll,

    /// Start the daemon by resurrecting its saved process list.
    StartDaemon,

    /// Kill the daemon and every process it manages.
    KillDaemon,

    /// Stop the worker loop.
    Shutdown,
}

/// Events sent from the worker to the control thread.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "daemonStatus",
///   "payload": { "running": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// Authoritative liveness result from a probe.
    DaemonStatus { running: bool },

    /// A fresh live snapshot. Empty when the daemon is down or the query failed.
    ListReady { processes: Vec<LiveProcessRecord> },

    /// Log text for one process, keyed by the target it was requested for.
    LogsReady { target: String, logs: String },

    /// A control action completed successfully.
    ActionFinished { title: String, message: String },

    /// A failure the user must see.
    Error { message: String },
}

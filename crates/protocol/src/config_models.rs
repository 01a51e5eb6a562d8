//! Declared process configuration models.
//!
//! A declared configuration is the user's persisted intent: which script to
//! run, from where, and with which supervisor options. The set of declared
//! configurations is keyed by `name`.

use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use ts_rs::TS;

/// Execution mode understood by the supervisor.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum ExecMode {
    /// One process per declaration.
    Fork,
    /// Load-balanced instances sharing a port.
    Cluster,
}

/// Number of instances to launch in cluster mode.
///
/// The supervisor accepts either a count or a keyword such as `"max"`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(untagged)]
pub enum Instances {
    Count(u32),
    Keyword(String),
}

/// A user-authored process declaration.
///
/// # Example
///
/// ```json
/// {
///   "name": "api",
///   "path": "/srv/api",
///   "script": "server.js",
///   "autorestart": true,
///   "watch": false,
///   "env": { "PORT": "8080" }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
pub struct DeclaredProcessConfig {
    /// Unique identifier across the declared set.
    pub name: String,

    /// Working directory the process is started from.
    pub path: String,

    /// Entry point, relative to `path` or absolute.
    pub script: String,

    /// Arguments passed to the script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,

    /// Interpreter binary (e.g. `python3`). Supervisor default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// Arguments passed to the interpreter itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_args: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec_mode: Option<ExecMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instances: Option<Instances>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autorestart: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,

    /// Memory threshold that triggers a restart, e.g. `"200M"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_restart: Option<String>,

    /// Cron pattern for forced restarts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_restart: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_date_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_logs: Option<bool>,

    /// Environment variables for the process. Keys are unique by construction.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl DeclaredProcessConfig {
    /// Create a minimal declaration with the store's defaults applied.
    ///
    /// New declarations restart automatically and do not watch files.
    pub fn new(name: impl Into<String>, path: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            script: script.into(),
            autorestart: Some(true),
            watch: Some(false),
            ..Self::default()
        }
    }

    /// Whether the process restarts automatically. Unset means enabled.
    pub fn autorestart_enabled(&self) -> bool {
        self.autorestart.unwrap_or(true)
    }
}

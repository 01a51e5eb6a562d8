//! Parsing of the supervisor's structured process snapshot.

use chrono::DateTime;
use chrono::Utc;
use fm_protocol::process_models::LiveProcessRecord;
use fm_protocol::process_models::Monitoring;
use fm_protocol::process_models::ProcessStatus;
use serde::Deserialize;

use crate::executor::FleetError;
use crate::format::parse_memory_threshold;

/// One entry of the `jlist` array. Only the fields the engine reads.
#[derive(Debug, Deserialize)]
struct RawProcess {
    #[serde(default)]
    name: String,
    #[serde(default)]
    pm_id: u32,
    #[serde(default)]
    pid: Option<u32>,
    #[serde(default)]
    monit: RawMonit,
    #[serde(default)]
    pm2_env: RawEnv,
}

#[derive(Debug, Default, Deserialize)]
struct RawMonit {
    #[serde(default)]
    cpu: f64,
    #[serde(default)]
    memory: f64,
}

#[derive(Debug, Default, Deserialize)]
struct RawEnv {
    status: Option<ProcessStatus>,
    #[serde(default)]
    restart_time: u32,
    /// Milliseconds since the epoch.
    pm_uptime: Option<i64>,
    max_memory_restart: Option<MemoryThreshold>,
    pm_out_log_path: Option<String>,
    pm_err_log_path: Option<String>,
}

/// The daemon reports thresholds as bytes, but older versions echo the
/// declared string back.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MemoryThreshold {
    Bytes(f64),
    Text(String),
}

impl MemoryThreshold {
    fn to_bytes(&self) -> Option<u64> {
        match self {
            Self::Bytes(bytes) if *bytes > 0.0 => Some(*bytes as u64),
            Self::Bytes(_) => None,
            Self::Text(text) => parse_memory_threshold(text),
        }
    }
}

impl From<RawProcess> for LiveProcessRecord {
    fn from(raw: RawProcess) -> Self {
        let env = raw.pm2_env;
        Self {
            name: raw.name,
            id: raw.pm_id,
            // pid 0 means "not running".
            pid: raw.pid.filter(|pid| *pid != 0),
            status: env.status.unwrap_or(ProcessStatus::Unknown),
            restart_count: env.restart_time,
            uptime_start: env.pm_uptime.and_then(DateTime::<Utc>::from_timestamp_millis),
            monitoring: Monitoring {
                cpu_percent: raw.monit.cpu,
                memory_bytes: raw.monit.memory.max(0.0) as u64,
            },
            max_memory_bytes: env.max_memory_restart.as_ref().and_then(MemoryThreshold::to_bytes),
            out_log_path: env.pm_out_log_path,
            err_log_path: env.pm_err_log_path,
        }
    }
}

/// Parse a `jlist` snapshot into live records, in the daemon's order.
///
/// Output captured from the supervisor can carry banner or warning text
/// ahead of the JSON array; when the whole text does not parse, parsing is
/// retried from every line that opens an array.
///
/// # Errors
///
/// Returns `FleetError::MalformedResponse` when no JSON array can be found.
/// Callers fold this into an empty list.
pub fn parse_snapshot(output: &str) -> Result<Vec<LiveProcessRecord>, FleetError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(FleetError::MalformedResponse("empty snapshot".to_string()));
    }

    let first_error = match serde_json::from_str::<Vec<RawProcess>>(trimmed) {
        Ok(raw) => return Ok(raw.into_iter().map(LiveProcessRecord::from).collect()),
        Err(e) => e,
    };

    let mut offset = 0;
    for line in trimmed.split_inclusive('\n') {
        if line.trim_start().starts_with('[') {
            if let Ok(raw) = serde_json::from_str::<Vec<RawProcess>>(&trimmed[offset..]) {
                return Ok(raw.into_iter().map(LiveProcessRecord::from).collect());
            }
        }
        offset += line.len();
    }

    Err(FleetError::MalformedResponse(first_error.to_string()))
}

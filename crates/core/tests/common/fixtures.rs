//! Test fixtures for declared configurations and supervisor snapshots.

use fm_protocol::config_models::DeclaredProcessConfig;
use fm_protocol::process_models::LiveProcessRecord;
use fm_protocol::process_models::Monitoring;
use fm_protocol::process_models::ProcessStatus;

/// Declarations for `names`, each rooted at `/srv/<name>`.
#[allow(dead_code)]
pub fn declared(names: &[&str]) -> Vec<DeclaredProcessConfig> {
    names
        .iter()
        .map(|name| DeclaredProcessConfig::new(*name, format!("/srv/{name}"), "main.js"))
        .collect()
}

#[allow(dead_code)]
pub fn live_record(name: &str, id: u32, status: ProcessStatus) -> LiveProcessRecord {
    LiveProcessRecord {
        name: name.to_string(),
        id,
        pid: Some(2000 + id),
        status,
        restart_count: 1,
        uptime_start: None,
        monitoring: Monitoring {
            cpu_percent: 1.5,
            memory_bytes: 10 * 1024 * 1024,
        },
        max_memory_bytes: None,
        out_log_path: Some(format!("/logs/{name}-out.log")),
        err_log_path: Some(format!("/logs/{name}-error.log")),
    }
}

/// A `jlist` response with one entry per `(name, status)`.
#[allow(dead_code)]
pub fn snapshot_json(entries: &[(&str, &str)]) -> String {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .enumerate()
        .map(|(id, (name, status))| {
            serde_json::json!({
                "name": name,
                "pm_id": id,
                "pid": 3000 + id,
                "monit": { "cpu": 2.0, "memory": 1048576 },
                "pm2_env": {
                    "status": status,
                    "restart_time": 0,
                    "pm_uptime": 1_700_000_000_000_i64,
                    "pm_out_log_path": format!("/logs/{name}-out.log"),
                    "pm_err_log_path": format!("/logs/{name}-error.log")
                }
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

/// Process-table output containing the daemon's title.
#[allow(dead_code)]
pub const DAEMON_PS_OUTPUT: &str =
    "COMMAND\n/sbin/init\nPM2 v5.3.1: God Daemon (/home/dev/.pm2)\nnode /srv/api/main.js\n";

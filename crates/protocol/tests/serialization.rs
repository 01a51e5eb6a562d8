use fm_protocol::*;
use std::collections::BTreeMap;

#[test]
fn test_declared_config_from_projects_file() {
    // Sample record as written by the project store
    let json_str = r#"
[
    {
        "name": "api",
        "path": "/srv/api",
        "script": "server.js",
        "autorestart": true,
        "watch": false,
        "exec_mode": "cluster",
        "instances": "max",
        "max_memory_restart": "300M",
        "env": {
            "NODE_ENV": "production",
            "PORT": "8080"
        }
    },
    {
        "name": "worker",
        "path": "/srv/worker",
        "script": "worker.py",
        "interpreter": "python3",
        "instances": 2
    }
]
"#;

    let configs: Vec<DeclaredProcessConfig> =
        serde_json::from_str(json_str).expect("Failed to deserialize declared configs");

    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0].name, "api");
    assert_eq!(configs[0].exec_mode, Some(ExecMode::Cluster));
    assert_eq!(configs[0].instances, Some(Instances::Keyword("max".to_string())));
    assert_eq!(configs[0].env.get("PORT").map(String::as_str), Some("8080"));
    assert_eq!(configs[1].interpreter.as_deref(), Some("python3"));
    assert_eq!(configs[1].instances, Some(Instances::Count(2)));
    assert!(configs[1].env.is_empty());
}

#[test]
fn test_declared_config_serialization() {
    let mut env = BTreeMap::new();
    env.insert("PORT".to_string(), "3000".to_string());
    let config = DeclaredProcessConfig {
        env,
        cron_restart: Some("0 3 * * *".to_string()),
        ..DeclaredProcessConfig::new("web", "/srv/web", "index.js")
    };

    let json = serde_json::to_string(&config).expect("Failed to serialize config");
    let deserialized: DeclaredProcessConfig =
        serde_json::from_str(&json).expect("Failed to deserialize config");

    assert_eq!(deserialized, config);
}

#[test]
fn test_daemon_state_serialization() {
    let json = serde_json::to_string(&DaemonState::Pending).expect("serialize");
    assert_eq!(json, "\"PENDING\"");
    assert_eq!(DaemonState::from_liveness(true), DaemonState::Running);
    assert_eq!(DaemonState::from_liveness(false), DaemonState::Stopped);
}

#[test]
fn test_list_ready_event_carries_records() {
    let record = LiveProcessRecord {
        name: "api".to_string(),
        id: 3,
        pid: Some(4242),
        status: ProcessStatus::Online,
        restart_count: 2,
        uptime_start: None,
        monitoring: Monitoring {
            cpu_percent: 1.5,
            memory_bytes: 52_428_800,
        },
        max_memory_bytes: None,
        out_log_path: None,
        err_log_path: None,
    };
    let event = Event::ListReady {
        processes: vec![record.clone()],
    };

    let json = serde_json::to_value(&event).expect("serialize");
    assert_eq!(json["type"], "listReady");
    assert_eq!(json["payload"]["processes"][0]["status"], "online");

    let back: Event = serde_json::from_value(json).expect("deserialize");
    assert_eq!(
        back,
        Event::ListReady {
            processes: vec![record]
        }
    );
}

#[test]
fn test_start_process_op_embeds_config() {
    let op = Op::StartProcess {
        config: DeclaredProcessConfig::new("svc", "/app", "main"),
    };
    let json = serde_json::to_value(&op).expect("serialize");
    assert_eq!(json["type"], "startProcess");
    assert_eq!(json["payload"]["config"]["name"], "svc");
    assert_eq!(json["payload"]["config"]["path"], "/app");
}

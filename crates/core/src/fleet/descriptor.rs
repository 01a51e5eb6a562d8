//! One-shot process-group descriptor handed to `start`.
//!
//! The supervisor starts processes from an ecosystem file. A declared
//! configuration is rendered into a single-app ecosystem, written to a
//! uniquely named temporary file, and removed once the command returns.

use fm_protocol::config_models::DeclaredProcessConfig;
use fm_protocol::config_models::ExecMode;
use fm_protocol::config_models::Instances;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::executor::FleetError;

/// The app entry of an ecosystem file. Empty fields are omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppDescriptor {
    pub name: String,
    pub script: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_memory_restart: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec_mode: Option<ExecMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instances: Option<Instances>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autorestart: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_restart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_logs: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_date_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_file: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cwd: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl From<&DeclaredProcessConfig> for AppDescriptor {
    fn from(config: &DeclaredProcessConfig) -> Self {
        let instances = match &config.instances {
            Some(Instances::Keyword(keyword)) if keyword.trim().is_empty() => None,
            other => other.clone(),
        };
        Self {
            name: config.name.clone(),
            script: config.script.clone(),
            args: non_empty(&config.args),
            interpreter: non_empty(&config.interpreter),
            node_args: non_empty(&config.node_args),
            watch: config.watch,
            max_memory_restart: non_empty(&config.max_memory_restart),
            env: config.env.clone(),
            exec_mode: config.exec_mode,
            instances,
            autorestart: config.autorestart,
            cron_restart: non_empty(&config.cron_restart),
            merge_logs: config.merge_logs,
            log_date_format: non_empty(&config.log_date_format),
            out_file: non_empty(&config.out_file),
            error_file: non_empty(&config.error_file),
            cwd: config.path.clone(),
        }
    }
}

/// `{"apps": [app]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcosystemDescriptor {
    pub apps: Vec<AppDescriptor>,
}

impl EcosystemDescriptor {
    pub fn single(config: &DeclaredProcessConfig) -> Self {
        Self {
            apps: vec![AppDescriptor::from(config)],
        }
    }
}

/// A descriptor written to disk. The file is removed when this is dropped.
pub struct DescriptorFile {
    file: NamedTempFile,
}

impl DescriptorFile {
    /// Write `descriptor` to a fresh temporary `.json` file.
    ///
    /// # Errors
    ///
    /// Returns `FleetError::Descriptor` if the file cannot be created or written.
    pub fn write(descriptor: &EcosystemDescriptor) -> Result<Self, FleetError> {
        let json = serde_json::to_vec_pretty(descriptor)
            .map_err(|e| FleetError::Descriptor(e.to_string()))?;

        let mut file = tempfile::Builder::new()
            .prefix("fleet-ecosystem-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| FleetError::Descriptor(e.to_string()))?;
        file.write_all(&json)
            .and_then(|()| file.flush())
            .map_err(|e| FleetError::Descriptor(e.to_string()))?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the file now, reporting any failure.
    pub fn close(self) {
        let path = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove process descriptor");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_descriptor_omits_empty_fields() {
        let mut config = DeclaredProcessConfig::new("svc", "/app", "main");
        config.args = Some("  ".to_string());
        config.interpreter = Some("python3".to_string());

        let value = serde_json::to_value(EcosystemDescriptor::single(&config)).expect("serialize");

        assert_eq!(
            value,
            json!({
                "apps": [{
                    "name": "svc",
                    "script": "main",
                    "interpreter": "python3",
                    "watch": false,
                    "autorestart": true,
                    "cwd": "/app"
                }]
            })
        );
    }

    #[test]
    fn test_descriptor_carries_env_and_cluster_options() {
        let mut config = DeclaredProcessConfig::new("api", "/srv/api", "server.js");
        config.exec_mode = Some(ExecMode::Cluster);
        config.instances = Some(Instances::Keyword("max".to_string()));
        config.env.insert("PORT".to_string(), "8080".to_string());

        let value = serde_json::to_value(EcosystemDescriptor::single(&config)).expect("serialize");
        let app = &value["apps"][0];

        assert_eq!(app["exec_mode"], "cluster");
        assert_eq!(app["instances"], "max");
        assert_eq!(app["env"]["PORT"], "8080");
        assert!(app.get("path").is_none());
    }

    #[test]
    fn test_descriptor_file_is_removed_on_drop() {
        let config = DeclaredProcessConfig::new("svc", "/app", "main");
        let file = DescriptorFile::write(&EcosystemDescriptor::single(&config)).expect("write");
        let path = file.path().to_path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("json"));
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(written["apps"][0]["name"], "svc");

        drop(file);
        assert!(!path.exists());
    }
}

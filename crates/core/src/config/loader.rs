//! Settings loader for `config.toml`.
//!
//! The settings file is optional. When present it must parse and validate;
//! configuration mistakes are reported rather than silently replaced by
//! defaults.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::app_config_dir;
use crate::config::models::Settings;
use std::path::Path;
use std::path::PathBuf;

/// Environment variable that overrides the settings file location.
pub const CONFIG_ENV_VAR: &str = "FLEET_CONFIG";

/// Default settings file location: `$FLEET_CONFIG`, else the per-user config dir.
pub fn default_config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| app_config_dir().join("config.toml"))
}

/// Loads settings from `path`.
///
/// # Returns
///
/// The parsed settings. If the file does not exist, returns the defaults
/// rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - The file exists but cannot be read
/// - The file has invalid TOML syntax or wrongly typed values
/// - A timeout, interval or line count is zero, or the binary name is empty
///
/// # Example
///
/// ```rust,no_run
/// use fm_core::config::loader::{default_config_path, load_settings};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = load_settings(&default_config_path())?;
/// println!("Polling every {:?}", settings.poll_interval());
/// # Ok(())
/// # }
/// ```
pub fn load_settings(path: &Path) -> ConfigResult<Settings> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No settings file, using defaults");
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let settings: Settings = toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    validate(&settings, path)?;
    Ok(settings)
}

fn validate(settings: &Settings, path: &Path) -> ConfigResult<()> {
    let invalid = |reason: &str| ConfigError::InvalidConfig {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if settings.supervisor_binary.trim().is_empty() {
        return Err(invalid("supervisor_binary must not be empty"));
    }
    if settings.command_timeout_secs == 0 {
        return Err(invalid("command_timeout_secs must be greater than zero"));
    }
    if settings.probe_timeout_secs == 0 {
        return Err(invalid("probe_timeout_secs must be greater than zero"));
    }
    if settings.poll_interval_secs == 0 {
        return Err(invalid("poll_interval_secs must be greater than zero"));
    }
    if settings.log_lines == 0 {
        return Err(invalid("log_lines must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_settings_full_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        let content = r#"
supervisor_binary = "/opt/node/bin/pm2"
command_timeout_secs = 30
probe_timeout_secs = 4
poll_interval_secs = 2
log_lines = 50
projects_file = "/srv/fleet/projects.json"
log_level = "debug"
"#;
        fs::write(&path, content).expect("Failed to write config.toml");

        let settings = load_settings(&path).expect("Failed to load settings");

        assert_eq!(settings.supervisor_binary, "/opt/node/bin/pm2");
        assert_eq!(settings.command_timeout_secs, 30);
        assert_eq!(settings.probe_timeout_secs, 4);
        assert_eq!(settings.poll_interval_secs, 2);
        assert_eq!(settings.log_lines, 50);
        assert_eq!(
            settings.projects_file,
            Some(PathBuf::from("/srv/fleet/projects.json"))
        );
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_load_settings_missing_file_uses_defaults() {
        let dir = tempdir().expect("Failed to create temp dir");
        let settings =
            load_settings(&dir.path().join("absent.toml")).expect("Should handle missing file");
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_partial_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "poll_interval_secs = 9").expect("Failed to write config.toml");

        let settings = load_settings(&path).expect("Should handle partial config");

        assert_eq!(settings.poll_interval_secs, 9);
        assert_eq!(settings.command_timeout_secs, 15);
        assert_eq!(settings.supervisor_binary, "pm2");
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_lines = [invalid toml").expect("Failed to write config.toml");

        let result = load_settings(&path);

        if let Err(ConfigError::TomlParse { path, .. }) = result {
            assert!(path.ends_with("config.toml"));
        } else {
            panic!("Expected TomlParse error");
        }
    }

    #[test]
    fn test_load_settings_rejects_zero_timeout() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "command_timeout_secs = 0").expect("Failed to write config.toml");

        let result = load_settings(&path);

        if let Err(ConfigError::InvalidConfig { reason, .. }) = result {
            assert!(reason.contains("command_timeout_secs"));
        } else {
            panic!("Expected InvalidConfig error");
        }
    }
}

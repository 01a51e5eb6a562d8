//! Key bindings and slash-command parsing.
//!
//! Both are pure: they turn input into an [`Action`] or a [`Command`] and
//! leave execution to the app.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use fm_protocol::config_models::DeclaredProcessConfig;
use fm_protocol::config_models::ExecMode;
use fm_protocol::config_models::Instances;

/// A user intent bound to a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SelectPrevious,
    SelectNext,
    StartSelected,
    StopSelected,
    RestartSelected,
    ReloadSelected,
    DeleteSelected,
    StopAll,
    RestartAll,
    StartDaemon,
    KillDaemon,
    Refresh,
    RefreshLogs,
    OpenCommandLine,
    DismissNotification,
    ScrollLogsUp,
    ScrollLogsDown,
    PageLogsUp,
    PageLogsDown,
}

impl Action {
    /// Actions still accepted behind the blocking overlay.
    pub fn allowed_while_blocked(self) -> bool {
        matches!(self, Self::Quit | Self::DismissNotification)
    }
}

pub fn action_for_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::RefreshLogs),
            _ => None,
        };
    }

    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Up | KeyCode::Char('k') => Action::SelectPrevious,
        KeyCode::Down | KeyCode::Char('j') => Action::SelectNext,
        KeyCode::Char('s') => Action::StartSelected,
        KeyCode::Char('x') => Action::StopSelected,
        KeyCode::Char('r') => Action::RestartSelected,
        KeyCode::Char('l') => Action::ReloadSelected,
        KeyCode::Char('d') => Action::DeleteSelected,
        KeyCode::Char('X') => Action::StopAll,
        KeyCode::Char('R') => Action::RestartAll,
        KeyCode::Char('D') => Action::StartDaemon,
        KeyCode::Char('K') => Action::KillDaemon,
        KeyCode::Char('f') | KeyCode::F(5) => Action::Refresh,
        KeyCode::Char('/') | KeyCode::Char(':') => Action::OpenCommandLine,
        KeyCode::Esc => Action::DismissNotification,
        KeyCode::Char('[') => Action::ScrollLogsUp,
        KeyCode::Char(']') => Action::ScrollLogsDown,
        KeyCode::PageUp => Action::PageLogsUp,
        KeyCode::PageDown => Action::PageLogsDown,
        _ => return None,
    };
    Some(action)
}

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/add <name> <path> <script>`
    Add {
        name: String,
        path: String,
        script: String,
    },
    /// `/remove <name>`
    Remove { name: String },
    /// `/set <name> <key>=<value>`; an empty value clears the field.
    Set {
        name: String,
        key: String,
        value: String,
    },
    /// `/logs`
    Logs,
    /// `/quit`
    Quit,
}

pub const COMMAND_USAGE: &str =
    "Commands: /add <name> <path> <script>, /remove <name>, /set <name> <key>=<value>, /logs, /quit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let Some(body) = line.strip_prefix('/') else {
        return Err(format!("Commands start with '/'. {COMMAND_USAGE}"));
    };
    let parts: Vec<&str> = body.split_whitespace().collect();

    match parts.as_slice() {
        ["add", name, path, script] => Ok(Command::Add {
            name: (*name).to_string(),
            path: (*path).to_string(),
            script: (*script).to_string(),
        }),
        ["remove" | "rm", name] => Ok(Command::Remove {
            name: (*name).to_string(),
        }),
        ["set", name, assignment, rest @ ..] => {
            let Some((key, first)) = assignment.split_once('=') else {
                return Err("Usage: /set <name> <key>=<value>".to_string());
            };
            // Values may contain spaces, e.g. script arguments.
            let value = std::iter::once(first)
                .chain(rest.iter().copied())
                .collect::<Vec<_>>()
                .join(" ");
            Ok(Command::Set {
                name: (*name).to_string(),
                key: key.to_string(),
                value: value.trim().to_string(),
            })
        }
        ["logs"] => Ok(Command::Logs),
        ["quit" | "q"] => Ok(Command::Quit),
        [] => Err(COMMAND_USAGE.to_string()),
        [verb, ..] => Err(format!("Unknown or malformed command '/{verb}'. {COMMAND_USAGE}")),
    }
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn optional_bool(key: &str, value: &str) -> Result<Option<bool>, String> {
    match value {
        "" => Ok(None),
        "true" | "yes" | "on" => Ok(Some(true)),
        "false" | "no" | "off" => Ok(Some(false)),
        other => Err(format!("'{key}' expects true or false, got '{other}'")),
    }
}

fn required(key: &str, value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("'{key}' cannot be empty"))
    } else {
        Ok(value.to_string())
    }
}

/// Apply `key=value` to a declaration.
///
/// Keys are the declaration's field names; `env.NAME` sets one environment
/// variable. An empty value clears optional fields.
pub fn apply_setting(
    config: &mut DeclaredProcessConfig,
    key: &str,
    value: &str,
) -> Result<(), String> {
    if let Some(var) = key.strip_prefix("env.") {
        if var.is_empty() {
            return Err("Environment variable name is missing".to_string());
        }
        if value.is_empty() {
            config.env.remove(var);
        } else {
            config.env.insert(var.to_string(), value.to_string());
        }
        return Ok(());
    }

    match key {
        "name" => config.name = required(key, value)?,
        "path" => config.path = required(key, value)?,
        "script" => config.script = required(key, value)?,
        "args" => config.args = optional(value),
        "interpreter" => config.interpreter = optional(value),
        "node_args" => config.node_args = optional(value),
        "exec_mode" => {
            config.exec_mode = match value {
                "" => None,
                "fork" => Some(ExecMode::Fork),
                "cluster" => Some(ExecMode::Cluster),
                other => return Err(format!("'exec_mode' expects fork or cluster, got '{other}'")),
            }
        }
        "instances" => {
            config.instances = match value {
                "" => None,
                v => Some(
                    v.parse::<u32>()
                        .map(Instances::Count)
                        .unwrap_or_else(|_| Instances::Keyword(v.to_string())),
                ),
            }
        }
        "autorestart" => config.autorestart = optional_bool(key, value)?,
        "watch" => config.watch = optional_bool(key, value)?,
        "merge_logs" => config.merge_logs = optional_bool(key, value)?,
        "max_memory_restart" => config.max_memory_restart = optional(value),
        "cron_restart" => config.cron_restart = optional(value),
        "out_file" => config.out_file = optional(value),
        "error_file" => config.error_file = optional(value),
        "log_date_format" => config.log_date_format = optional(value),
        other => return Err(format!("Unknown setting '{other}'")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Option<Action> {
        action_for_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_key_map() {
        assert_eq!(press(KeyCode::Char('q')), Some(Action::Quit));
        assert_eq!(press(KeyCode::Down), Some(Action::SelectNext));
        assert_eq!(press(KeyCode::Char('x')), Some(Action::StopSelected));
        assert_eq!(press(KeyCode::Char('X')), Some(Action::StopAll));
        assert_eq!(press(KeyCode::Char('K')), Some(Action::KillDaemon));
        assert_eq!(press(KeyCode::Char('z')), None);
        assert_eq!(
            action_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_only_quit_and_dismiss_pass_the_overlay() {
        assert!(Action::Quit.allowed_while_blocked());
        assert!(!Action::KillDaemon.allowed_while_blocked());
        assert!(!Action::Refresh.allowed_while_blocked());
    }

    #[test]
    fn test_parse_add_and_remove() {
        assert_eq!(
            parse_command("/add api /srv/api server.js"),
            Ok(Command::Add {
                name: "api".to_string(),
                path: "/srv/api".to_string(),
                script: "server.js".to_string(),
            })
        );
        assert_eq!(
            parse_command(" /rm api "),
            Ok(Command::Remove {
                name: "api".to_string()
            })
        );
        assert!(parse_command("/add api /srv/api").is_err());
        assert!(parse_command("add api").is_err());
    }

    #[test]
    fn test_parse_set_keeps_spaces_in_value() {
        assert_eq!(
            parse_command("/set api args=--port 8080 --verbose"),
            Ok(Command::Set {
                name: "api".to_string(),
                key: "args".to_string(),
                value: "--port 8080 --verbose".to_string(),
            })
        );
        assert!(parse_command("/set api args").is_err());
    }

    #[test]
    fn test_apply_setting_updates_fields() {
        let mut config = DeclaredProcessConfig::new("api", "/srv/api", "server.js");

        apply_setting(&mut config, "interpreter", "python3").unwrap();
        apply_setting(&mut config, "instances", "max").unwrap();
        apply_setting(&mut config, "watch", "true").unwrap();
        apply_setting(&mut config, "env.PORT", "8080").unwrap();

        assert_eq!(config.interpreter.as_deref(), Some("python3"));
        assert_eq!(config.instances, Some(Instances::Keyword("max".to_string())));
        assert_eq!(config.watch, Some(true));
        assert_eq!(config.env.get("PORT").map(String::as_str), Some("8080"));

        apply_setting(&mut config, "interpreter", "").unwrap();
        apply_setting(&mut config, "env.PORT", "").unwrap();
        assert!(config.interpreter.is_none());
        assert!(config.env.is_empty());
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut config = DeclaredProcessConfig::new("api", "/srv/api", "server.js");
        assert!(apply_setting(&mut config, "name", "").is_err());
        assert!(apply_setting(&mut config, "watch", "maybe").is_err());
        assert!(apply_setting(&mut config, "exec_mode", "thread").is_err());
        assert!(apply_setting(&mut config, "colour", "blue").is_err());
        assert_eq!(config, DeclaredProcessConfig::new("api", "/srv/api", "server.js"));
    }
}

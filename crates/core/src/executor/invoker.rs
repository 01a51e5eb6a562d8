//! Spawning external processes with a hard timeout.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::executor::command::CommandLine;
use crate::executor::command::CommandResult;

/// The capability to run one command line to completion or timeout.
///
/// Implementations never fail: every outcome, including a missing program,
/// is expressed as a [`CommandResult`].
#[async_trait]
pub trait ProcessInvoker: Send + Sync {
    async fn invoke(
        &self,
        command: &CommandLine,
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> CommandResult;
}

/// Invoker backed by real OS processes.
///
/// On timeout the child is dropped, which sends it a kill signal. The kill
/// is not awaited.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemInvoker;

#[async_trait]
impl ProcessInvoker for SystemInvoker {
    async fn invoke(
        &self,
        command: &CommandLine,
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> CommandResult {
        // Resolve through PATH (and PATHEXT on Windows, where the supervisor
        // is usually a `.cmd` shim).
        let program = match which::which(command.program()) {
            Ok(program) => program,
            Err(_) => return CommandResult::NotFound,
        };

        let mut cmd = Command::new(program);
        cmd.args(command.arguments());
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        #[cfg(windows)]
        {
            const CREATE_NO_WINDOW: u32 = 0x0800_0000;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => return CommandResult::NotFound,
            Err(e) => {
                return CommandResult::Failure(format!(
                    "Failed to spawn command '{command}': {e}"
                ))
            }
        };

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Err(_) => CommandResult::TimedOut,
            Ok(Err(e)) => CommandResult::Failure(format!("Failed to wait for '{command}': {e}")),
            Ok(Ok(output)) => {
                let text = combine_output(&output.stdout, &output.stderr);
                if output.status.success() {
                    CommandResult::Success(text)
                } else {
                    CommandResult::Failure(text)
                }
            }
        }
    }
}

/// Stdout followed by stderr, decoded lossily.
fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut text = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&String::from_utf8_lossy(stderr));
    }
    text
}

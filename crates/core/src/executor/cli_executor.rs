//! Command executor with the error-surfacing policy.
//!
//! Every supervisor command goes through [`CommandExecutor::run`]. The
//! executor decides whether a failure is shown to the user (as an
//! [`Event::Error`]) or handed back quietly for the caller to interpret.

use fm_protocol::ipc::Event;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::executor::command::CommandLine;
use crate::executor::command::CommandResult;
use crate::executor::error::FleetError;
use crate::executor::invoker::ProcessInvoker;

/// Runs supervisor commands and surfaces failures to the control thread.
#[derive(Clone)]
pub struct CommandExecutor {
    invoker: Arc<dyn ProcessInvoker>,
    events_tx: UnboundedSender<Event>,
    timeout: Duration,
}

impl CommandExecutor {
    /// Create an executor.
    ///
    /// # Arguments
    ///
    /// * `invoker` - The process spawning capability
    /// * `events_tx` - Channel used to surface user-visible errors
    /// * `timeout` - Hard limit applied to every command
    pub fn new(
        invoker: Arc<dyn ProcessInvoker>,
        events_tx: UnboundedSender<Event>,
        timeout: Duration,
    ) -> Self {
        Self {
            invoker,
            events_tx,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one command to completion or timeout.
    ///
    /// # Arguments
    ///
    /// * `command` - The command line to run
    /// * `cwd` - Optional working directory
    /// * `allow_failure` - When true, a non-zero exit or timeout is returned
    ///   without surfacing an error
    ///
    /// # Returns
    ///
    /// The classified outcome. A missing program is always surfaced,
    /// regardless of `allow_failure`.
    pub async fn run(
        &self,
        command: &CommandLine,
        cwd: Option<&Path>,
        allow_failure: bool,
    ) -> CommandResult {
        tracing::debug!(%command, allow_failure, "Running command");
        let result = self.invoker.invoke(command, cwd, self.timeout).await;

        match &result {
            CommandResult::Success(output) => {
                tracing::debug!(%command, bytes = output.len(), "Command succeeded");
            }
            CommandResult::NotFound => {
                let error = FleetError::ToolNotFound {
                    program: command.program().to_string(),
                };
                tracing::error!(%command, "Command not found");
                self.surface(format!("Error: {error}"));
            }
            CommandResult::Failure(_) | CommandResult::TimedOut if allow_failure => {
                tracing::warn!(
                    %command,
                    output = result.output(),
                    "Tolerated command failure"
                );
            }
            CommandResult::Failure(_) | CommandResult::TimedOut => {
                tracing::error!(%command, output = result.output(), "Command failed");
                let error = FleetError::CommandFailed {
                    command: command.to_string(),
                    output: result.output().to_string(),
                };
                self.surface(error.to_string());
            }
        }

        result
    }

    fn surface(&self, message: String) {
        if self.events_tx.send(Event::Error { message }).is_err() {
            tracing::warn!("Event channel closed; dropping error notification");
        }
    }
}

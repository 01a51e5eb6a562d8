//! Daemon liveness detection.
//!
//! The supervisor's own CLI spawns the daemon as a side effect of almost
//! every command, so liveness is decided from the OS process table instead.
//! A probe never fails: every ambiguous outcome reads as "not running".

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::executor::CommandLine;
use crate::executor::CommandResult;
use crate::executor::ProcessInvoker;

/// Answers whether the supervisor daemon is currently alive.
#[async_trait]
pub trait DaemonProbe: Send + Sync {
    async fn is_daemon_running(&self) -> bool;
}

/// How the process table is queried and how its output is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStrategy {
    /// `ps`, matching the daemon's process title.
    Unix,
    /// `wmic`, filtering node processes by command line.
    Windows,
}

impl ProbeStrategy {
    pub fn for_current_os() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    pub fn command(self) -> CommandLine {
        match self {
            Self::Unix => CommandLine::new("ps").args(["-A", "-o", "command"]),
            Self::Windows => CommandLine::new("wmic").args([
                "process",
                "where",
                "name='node.exe' and commandline like '%PM2%Daemon.js%'",
                "get",
                "ProcessId",
            ]),
        }
    }

    /// Decide liveness from the query's output.
    pub fn matches(self, output: &str) -> bool {
        match self {
            Self::Unix => output.lines().any(is_daemon_title),
            Self::Windows => {
                // A header line plus at least one pid row.
                let rows = output.lines().filter(|line| !line.trim().is_empty()).count();
                output.contains("ProcessId") && rows > 1
            }
        }
    }
}

/// The daemon renames itself to `PM2 v<version>: God Daemon (<home>)`.
fn is_daemon_title(line: &str) -> bool {
    line.find("PM2 v")
        .map(|start| line[start..].contains(": God Daemon"))
        .unwrap_or(false)
}

/// Probe backed by an OS process-table query.
pub struct ProcessTableProbe {
    invoker: Arc<dyn ProcessInvoker>,
    strategy: ProbeStrategy,
    timeout: Duration,
}

impl ProcessTableProbe {
    pub fn new(invoker: Arc<dyn ProcessInvoker>, strategy: ProbeStrategy, timeout: Duration) -> Self {
        Self {
            invoker,
            strategy,
            timeout,
        }
    }

    /// Probe using the strategy for the platform this binary was built for.
    pub fn for_current_os(invoker: Arc<dyn ProcessInvoker>, timeout: Duration) -> Self {
        Self::new(invoker, ProbeStrategy::for_current_os(), timeout)
    }
}

#[async_trait]
impl DaemonProbe for ProcessTableProbe {
    async fn is_daemon_running(&self) -> bool {
        let command = self.strategy.command();
        match self.invoker.invoke(&command, None, self.timeout).await {
            CommandResult::Success(output) => {
                let running = self.strategy.matches(&output);
                tracing::debug!(running, "Daemon probe finished");
                running
            }
            // wmic exits non-zero when the filter matches nothing.
            CommandResult::Failure(output) => {
                tracing::debug!(%command, output = %output.trim(), "Process query failed; assuming daemon is down");
                false
            }
            CommandResult::NotFound => {
                tracing::warn!(program = command.program(), "Process query tool not found; assuming daemon is down");
                false
            }
            CommandResult::TimedOut => {
                tracing::warn!(timeout = ?self.timeout, "Process query timed out; assuming daemon is down");
                false
            }
        }
    }
}

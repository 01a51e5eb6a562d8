//! Supervisor query and control client.
//!
//! Every operation reports its results as [`Event`]s on the channel it was
//! built with. Control operations always finish with a full
//! [`FleetClient::refresh_list`], so the control thread converges on the
//! daemon's real state whether or not the action itself succeeded.

use fm_protocol::config_models::DeclaredProcessConfig;
use fm_protocol::ipc::Event;
use fm_protocol::ipc::Op;
use fm_protocol::process_models::LiveProcessRecord;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

use crate::config::models::Settings;
use crate::executor::CommandExecutor;
use crate::executor::CommandLine;
use crate::executor::CommandResult;
use crate::executor::ProcessInvoker;
use crate::executor::SystemInvoker;
use crate::fleet::descriptor::DescriptorFile;
use crate::fleet::descriptor::EcosystemDescriptor;
use crate::fleet::snapshot::parse_snapshot;
use crate::probe::DaemonProbe;
use crate::probe::ProcessTableProbe;

/// Snapshot taken once at startup, before the worker is running.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InitialState {
    pub live: Vec<LiveProcessRecord>,
    pub daemon_running: bool,
}

/// Issues supervisor commands and reports their outcomes as events.
pub struct FleetClient {
    executor: CommandExecutor,
    probe: Arc<dyn DaemonProbe>,
    events_tx: UnboundedSender<Event>,
    binary: String,
    log_lines: u32,
}

impl FleetClient {
    /// Create a client from its collaborators.
    ///
    /// # Arguments
    ///
    /// * `executor` - Runs supervisor commands; must share `events_tx`
    /// * `probe` - Liveness check consulted before every query
    /// * `events_tx` - Channel for result notifications
    /// * `binary` - Supervisor executable name or path
    /// * `log_lines` - Tail length for log fetches
    pub fn new(
        executor: CommandExecutor,
        probe: Arc<dyn DaemonProbe>,
        events_tx: UnboundedSender<Event>,
        binary: impl Into<String>,
        log_lines: u32,
    ) -> Self {
        Self {
            executor,
            probe,
            events_tx,
            binary: binary.into(),
            log_lines,
        }
    }

    /// Wire a client to `invoker` using the configured timeouts and binary.
    pub fn with_invoker(
        settings: &Settings,
        invoker: Arc<dyn ProcessInvoker>,
        events_tx: UnboundedSender<Event>,
    ) -> Self {
        let executor = CommandExecutor::new(
            Arc::clone(&invoker),
            events_tx.clone(),
            settings.command_timeout(),
        );
        let probe = Arc::new(ProcessTableProbe::for_current_os(
            invoker,
            settings.probe_timeout(),
        ));
        Self::new(
            executor,
            probe,
            events_tx,
            settings.supervisor_binary.clone(),
            settings.log_lines,
        )
    }

    /// Client backed by real OS processes.
    pub fn system(settings: &Settings, events_tx: UnboundedSender<Event>) -> Self {
        Self::with_invoker(settings, Arc::new(SystemInvoker), events_tx)
    }

    fn command(&self) -> CommandLine {
        CommandLine::new(self.binary.as_str())
    }

    fn emit(&self, event: Event) {
        if self.events_tx.send(event).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }

    /// Probe liveness and, only if the daemon is up, fetch the live list.
    ///
    /// Emits nothing. Used once at startup before asynchronous machinery
    /// is active.
    pub async fn get_initial_state(&self) -> InitialState {
        let daemon_running = self.probe.is_daemon_running().await;
        if !daemon_running {
            return InitialState::default();
        }
        InitialState {
            live: self.query_live_list().await,
            daemon_running,
        }
    }

    /// Run `jlist` and parse it. Every failure folds into an empty list.
    async fn query_live_list(&self) -> Vec<LiveProcessRecord> {
        let command = self.command().arg("jlist");
        let output = match self.executor.run(&command, None, true).await {
            CommandResult::Success(output) | CommandResult::Failure(output) => output,
            CommandResult::NotFound | CommandResult::TimedOut => return Vec::new(),
        };
        match parse_snapshot(&output) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(error = %e, "Daemon is running but the snapshot is unusable; reporting empty list");
                Vec::new()
            }
        }
    }

    /// Emit the liveness verdict followed by the live list.
    ///
    /// The list is empty when the daemon is down; the daemon is never
    /// queried in that case since querying would start it.
    pub async fn refresh_list(&self) {
        let running = self.probe.is_daemon_running().await;
        self.emit(Event::DaemonStatus { running });

        let processes = if running {
            self.query_live_list().await
        } else {
            Vec::new()
        };
        self.emit(Event::ListReady { processes });
    }

    /// Emit the recent log tail for `target`. Failures are silent.
    pub async fn fetch_logs(&self, target: &str) {
        let command = self.command().args([
            "logs".to_string(),
            target.to_string(),
            "--lines".to_string(),
            self.log_lines.to_string(),
            "--nostream".to_string(),
        ]);
        if let CommandResult::Success(logs) = self.executor.run(&command, None, true).await {
            if !logs.is_empty() {
                self.emit(Event::LogsReady {
                    target: target.to_string(),
                    logs,
                });
            }
        }
    }

    /// Start a declared process through a one-shot descriptor file.
    ///
    /// The descriptor is removed before the follow-up refresh, whatever
    /// the outcome of the start command.
    pub async fn start_process(&self, config: &DeclaredProcessConfig) {
        match DescriptorFile::write(&EcosystemDescriptor::single(config)) {
            Ok(descriptor) => {
                let command = self.command().arg("start").path_arg(descriptor.path());
                let result = self.executor.run(&command, None, false).await;
                descriptor.close();

                if let CommandResult::Success(output) = result {
                    self.emit(Event::ActionFinished {
                        title: "Process Started".to_string(),
                        message: format!("Attempted to start '{}'.\n{}", config.name, output),
                    });
                }
            }
            Err(e) => {
                tracing::error!(name = %config.name, error = %e, "Could not prepare start");
                self.emit(Event::Error {
                    message: e.to_string(),
                });
            }
        }
        self.refresh_list().await;
    }

    async fn control(&self, args: &[&str], title: &str, message: String) {
        let command = self.command().args(args.iter().copied());
        if let CommandResult::Success(output) = self.executor.run(&command, None, false).await {
            let message = if output.is_empty() {
                message
            } else {
                format!("{message}\n{output}")
            };
            self.emit(Event::ActionFinished {
                title: title.to_string(),
                message,
            });
        }
        self.refresh_list().await;
    }

    pub async fn stop_process(&self, target: &str) {
        self.control(&["stop", target], "Process Stopped", format!("Stopped '{target}'."))
            .await;
    }

    pub async fn restart_process(&self, target: &str) {
        self.control(
            &["restart", target],
            "Process Restarted",
            format!("Restarted '{target}'."),
        )
        .await;
    }

    /// Zero-downtime restart where the process supports it.
    pub async fn reload_process(&self, target: &str) {
        self.control(
            &["reload", target],
            "Process Reloaded",
            format!("Reloaded '{target}'."),
        )
        .await;
    }

    /// Remove `target` from the supervisor. Its declaration is untouched.
    pub async fn delete_process(&self, target: &str) {
        self.control(
            &["delete", target],
            "Process Deleted",
            format!("Deleted '{target}' from the supervisor."),
        )
        .await;
    }

    pub async fn stop_all(&self) {
        self.control(
            &["stop", "all"],
            "All Processes Stopped",
            "Stopped every process.".to_string(),
        )
        .await;
    }

    pub async fn restart_all(&self) {
        self.control(
            &["restart", "all"],
            "All Processes Restarted",
            "Restarted every process.".to_string(),
        )
        .await;
    }

    /// Bring the daemon up by resurrecting its saved process list.
    ///
    /// A failed resurrect is not an error: with nothing saved the command
    /// still leaves a running daemon behind.
    pub async fn start_daemon(&self) {
        let command = self.command().arg("resurrect");
        self.executor.run(&command, None, true).await;
        self.emit(Event::ActionFinished {
            title: "Supervisor Daemon".to_string(),
            message: "Attempting to start/resurrect the daemon...".to_string(),
        });
        self.refresh_list().await;
    }

    /// Kill the daemon and everything it manages.
    pub async fn kill_daemon(&self) {
        let command = self.command().arg("kill");
        if self.executor.run(&command, None, false).await.is_success() {
            self.emit(Event::ActionFinished {
                title: "Daemon Killed".to_string(),
                message: "The supervisor daemon has been stopped.".to_string(),
            });
        }
        self.refresh_list().await;
    }

    /// Carry out one operation.
    ///
    /// # Returns
    ///
    /// `false` once the worker should stop.
    pub async fn dispatch(&self, op: Op) -> bool {
        tracing::debug!(?op, "Dispatching operation");
        match op {
            Op::RefreshList => self.refresh_list().await,
            Op::FetchLogs { target } => self.fetch_logs(&target).await,
            Op::StartProcess { config } => self.start_process(&config).await,
            Op::StopProcess { target } => self.stop_process(&target).await,
            Op::RestartProcess { target } => self.restart_process(&target).await,
            Op::ReloadProcess { target } => self.reload_process(&target).await,
            Op::DeleteProcess { target } => self.delete_process(&target).await,
            Op::StopAll => self.stop_all().await,
            Op::RestartAll => self.restart_all().await,
            Op::StartDaemon => self.start_daemon().await,
            Op::KillDaemon => self.kill_daemon().await,
            Op::Shutdown => return false,
        }
        true
    }
}

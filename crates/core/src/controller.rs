//! Control-thread session state.
//!
//! The [`Controller`] owns everything the presentation layer reads: the
//! project store, the daemon state machine, the rendered list, the current
//! selection and its logs. It is mutated only from the control thread. The
//! worker is reached exclusively through the `Op` channel, and its results
//! come back through [`Controller::handle_event`].

use fm_protocol::config_models::DeclaredProcessConfig;
use fm_protocol::daemon_models::DaemonState;
use fm_protocol::ipc::Event;
use fm_protocol::ipc::Op;
use fm_protocol::process_models::FleetSummary;
use fm_protocol::process_models::LiveProcessRecord;
use fm_protocol::process_models::MergedProjectView;
use tokio::sync::mpsc::UnboundedSender;

use crate::daemon::DaemonStateMachine;
use crate::daemon::PollCommand;
use crate::daemon::StateEffects;
use crate::daemon::Transition;
use crate::fleet::InitialState;
use crate::reconcile::reconcile;
use crate::reconcile::RenderedView;
use crate::reconcile::ViewDelta;
use crate::store::ProjectStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

/// A message for the user, shown until replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Work the presentation layer must carry out after a controller call.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEffect {
    StartPolling,
    StopPolling,
    /// The daemon state changed; apply the enable flags and overlay.
    StateChanged(Transition),
    ViewChanged(ViewDelta),
    /// Fresh log text for the selected process.
    LogsUpdated { name: String },
    Notify(Notification),
}

pub struct Controller {
    store: ProjectStore,
    machine: DaemonStateMachine,
    view: RenderedView,
    live: Vec<LiveProcessRecord>,
    selected: Option<String>,
    logs: Option<(String, String)>,
    notification: Option<Notification>,
    polling: bool,
    ops_tx: UnboundedSender<Op>,
}

impl Controller {
    /// Create a controller in the initial `Pending` state.
    ///
    /// # Arguments
    ///
    /// * `store` - Declared configurations
    /// * `ops_tx` - Channel to the fleet worker
    pub fn new(store: ProjectStore, ops_tx: UnboundedSender<Op>) -> Self {
        Self {
            store,
            machine: DaemonStateMachine::new(),
            view: RenderedView::new(),
            live: Vec::new(),
            selected: None,
            logs: None,
            notification: None,
            polling: false,
            ops_tx,
        }
    }

    pub fn state(&self) -> DaemonState {
        self.machine.state()
    }

    pub fn effects(&self) -> StateEffects {
        self.machine.current_effects()
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn rows(&self) -> &[MergedProjectView] {
        self.view.rows()
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_view(&self) -> Option<&MergedProjectView> {
        self.selected.as_deref().and_then(|name| self.view.find(name))
    }

    /// Log text for the current selection, if any has arrived.
    pub fn selected_logs(&self) -> Option<&str> {
        match (&self.logs, &self.selected) {
            (Some((name, logs)), Some(selected)) if name == selected => Some(logs),
            _ => None,
        }
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    pub fn summary(&self) -> FleetSummary {
        FleetSummary::from_views(self.view.rows())
    }

    fn send(&self, op: Op) {
        if self.ops_tx.send(op).is_err() {
            tracing::error!("Fleet worker is gone; operation dropped");
        }
    }

    /// Show `notification` until it is replaced or dismissed.
    pub fn notify(&mut self, notification: Notification) -> UiEffect {
        self.notification = Some(notification.clone());
        UiEffect::Notify(notification)
    }

    fn refuse(&mut self, message: impl Into<String>) -> Vec<UiEffect> {
        vec![self.notify(Notification::error("Action unavailable", message))]
    }

    /// Apply the startup snapshot: leave `Pending` and populate the list.
    pub fn bootstrap(&mut self, initial: InitialState) -> Vec<UiEffect> {
        let mut effects = self.apply_liveness(initial.daemon_running);
        effects.extend(self.apply_live_list(initial.live));
        effects
    }

    pub fn handle_event(&mut self, event: Event) -> Vec<UiEffect> {
        match event {
            Event::DaemonStatus { running } => self.apply_liveness(running),
            Event::ListReady { processes } => self.apply_live_list(processes),
            Event::LogsReady { target, logs } => {
                if self.selected.as_deref() == Some(target.as_str()) {
                    self.logs = Some((target.clone(), logs));
                    vec![UiEffect::LogsUpdated { name: target }]
                } else {
                    tracing::debug!(%target, "Dropping logs for a process that is no longer selected");
                    Vec::new()
                }
            }
            Event::ActionFinished { title, message } => {
                vec![self.notify(Notification::info(title, message))]
            }
            Event::Error { message } => vec![self.notify(Notification::error("Error", message))],
        }
    }

    fn apply_liveness(&mut self, running: bool) -> Vec<UiEffect> {
        let mut effects = Vec::new();
        for transition in self.machine.apply_liveness(running) {
            effects.extend(self.apply_transition(transition));
        }
        effects
    }

    fn apply_transition(&mut self, transition: Transition) -> Vec<UiEffect> {
        let mut effects = Vec::new();
        match transition.effects.poll {
            PollCommand::Start if !self.polling => {
                self.polling = true;
                effects.push(UiEffect::StartPolling);
            }
            PollCommand::Stop if self.polling => {
                self.polling = false;
                effects.push(UiEffect::StopPolling);
            }
            _ => {}
        }
        let clear = transition.effects.clear_live_list;
        effects.push(UiEffect::StateChanged(transition));
        if clear {
            self.live.clear();
            effects.extend(self.render());
        }
        effects
    }

    fn apply_live_list(&mut self, processes: Vec<LiveProcessRecord>) -> Vec<UiEffect> {
        self.live = if self.machine.state() == DaemonState::Stopped {
            Vec::new()
        } else {
            processes
        };
        self.render()
    }

    /// Re-merge the store with the last snapshot and diff against the screen.
    fn render(&mut self) -> Vec<UiEffect> {
        let views = reconcile(self.store.list(), &self.live);
        match self.view.apply(views) {
            ViewDelta::Patch(patch) if patch.is_empty() => Vec::new(),
            delta => vec![UiEffect::ViewChanged(delta)],
        }
    }

    /// Select a process by name, or clear the selection.
    ///
    /// A new selection of a deployed process requests its logs.
    pub fn select(&mut self, name: Option<&str>) -> Vec<UiEffect> {
        if self.selected.as_deref() == name {
            return Vec::new();
        }
        self.selected = name.map(str::to_string);
        self.logs = None;

        if let Some(view) = self.selected_view() {
            if view.is_deployed() {
                let target = view.name().to_string();
                self.send(Op::FetchLogs { target });
            }
        }
        Vec::new()
    }

    /// Re-request logs for the current selection.
    pub fn refresh_logs(&mut self) -> Vec<UiEffect> {
        match self.selected_view() {
            Some(view) if view.is_deployed() => {
                let target = view.name().to_string();
                self.send(Op::FetchLogs { target });
                Vec::new()
            }
            Some(view) => {
                let message = format!("'{}' is not deployed; it has no logs", view.name());
                self.refuse(message)
            }
            None => self.refuse("Select a process first"),
        }
    }

    /// Ask the worker for a fresh liveness answer and list. Always allowed.
    pub fn refresh(&mut self) {
        self.send(Op::RefreshList);
    }

    pub fn request_start_daemon(&mut self) -> Vec<UiEffect> {
        match self.machine.request_start_daemon() {
            Ok(transition) => {
                let effects = self.apply_transition(transition);
                self.send(Op::StartDaemon);
                effects
            }
            Err(e) => self.refuse(e.to_string()),
        }
    }

    /// Kill the daemon. The machine accepts this from `Stopped` too, but the
    /// action is only offered while the daemon runs.
    pub fn request_kill_daemon(&mut self) -> Vec<UiEffect> {
        if !self.machine.current_effects().kill_daemon_enabled {
            return self.refuse(format!("The daemon is {}", self.machine.state()));
        }
        match self.machine.request_kill_daemon() {
            Ok(transition) => {
                let effects = self.apply_transition(transition);
                self.send(Op::KillDaemon);
                effects
            }
            Err(e) => self.refuse(e.to_string()),
        }
    }

    fn process_actions_enabled(&self) -> bool {
        self.machine.current_effects().process_actions_enabled
    }

    /// Check that process actions are enabled and a process is selected.
    fn selected_for_action(&self, needs_live: bool) -> Result<&MergedProjectView, String> {
        if !self.process_actions_enabled() {
            return Err(format!("The daemon is {}", self.machine.state()));
        }
        let view = self
            .selected_view()
            .ok_or_else(|| "Select a process first".to_string())?;
        if needs_live && !view.is_deployed() {
            return Err(format!("'{}' is not deployed", view.name()));
        }
        Ok(view)
    }

    pub fn start_selected(&mut self) -> Vec<UiEffect> {
        match self.selected_for_action(false) {
            Ok(view) => {
                let config = view.config.clone();
                self.send(Op::StartProcess { config });
                Vec::new()
            }
            Err(reason) => self.refuse(reason),
        }
    }

    fn target_action(&mut self, make: fn(String) -> Op) -> Vec<UiEffect> {
        match self.selected_for_action(true) {
            Ok(view) => {
                let target = view.name().to_string();
                self.send(make(target));
                Vec::new()
            }
            Err(reason) => self.refuse(reason),
        }
    }

    pub fn stop_selected(&mut self) -> Vec<UiEffect> {
        self.target_action(|target| Op::StopProcess { target })
    }

    pub fn restart_selected(&mut self) -> Vec<UiEffect> {
        self.target_action(|target| Op::RestartProcess { target })
    }

    pub fn reload_selected(&mut self) -> Vec<UiEffect> {
        self.target_action(|target| Op::ReloadProcess { target })
    }

    /// Remove the selected process from the supervisor, keeping its declaration.
    pub fn delete_selected(&mut self) -> Vec<UiEffect> {
        self.target_action(|target| Op::DeleteProcess { target })
    }

    pub fn stop_all(&mut self) -> Vec<UiEffect> {
        if !self.process_actions_enabled() {
            return self.refuse(format!("The daemon is {}", self.machine.state()));
        }
        self.send(Op::StopAll);
        Vec::new()
    }

    pub fn restart_all(&mut self) -> Vec<UiEffect> {
        if !self.process_actions_enabled() {
            return self.refuse(format!("The daemon is {}", self.machine.state()));
        }
        self.send(Op::RestartAll);
        Vec::new()
    }

    /// Declare a new process and show it immediately as undeployed.
    pub fn add_project(&mut self, name: &str, path: &str, script: &str) -> Vec<UiEffect> {
        if let Err(e) = self.store.try_add(name, path, script) {
            return vec![self.notify(Notification::error("Add failed", e.to_string()))];
        }
        let mut effects = self.render();
        effects.push(self.notify(Notification::info(
            "Project added",
            format!("Project '{}' added.", name.trim()),
        )));
        self.send(Op::RefreshList);
        effects
    }

    /// Forget a declared process, deleting it from the supervisor first when
    /// it is deployed.
    pub fn remove_project(&mut self, name: &str) -> Vec<UiEffect> {
        let deployed = self.view.find(name).is_some_and(MergedProjectView::is_deployed);
        if let Err(e) = self.store.try_remove(name) {
            return vec![self.notify(Notification::error("Remove failed", e.to_string()))];
        }
        if deployed {
            self.send(Op::DeleteProcess {
                target: name.to_string(),
            });
        }
        if self.selected.as_deref() == Some(name) {
            self.selected = None;
            self.logs = None;
        }

        let mut effects = self.render();
        effects.push(self.notify(Notification::info(
            "Project removed",
            format!("Project '{name}' removed."),
        )));
        self.send(Op::RefreshList);
        effects
    }

    /// Replace a declaration.
    ///
    /// A deployed process keeps its old options until it is recreated, so a
    /// changed configuration deletes it from the supervisor first.
    pub fn reconfigure_project(
        &mut self,
        old_name: &str,
        new: DeclaredProcessConfig,
    ) -> Vec<UiEffect> {
        let Some(original) = self.store.find(old_name).cloned() else {
            return vec![self.notify(Notification::error(
                "Update failed",
                format!("No project named '{old_name}'"),
            ))];
        };
        let deployed = self.view.find(old_name).is_some_and(MergedProjectView::is_deployed);
        if deployed && original != new {
            self.send(Op::DeleteProcess {
                target: old_name.to_string(),
            });
        }

        let new_name = new.name.clone();
        if let Err(e) = self.store.try_update(old_name, new) {
            self.send(Op::RefreshList);
            return vec![self.notify(Notification::error("Update failed", e.to_string()))];
        }
        if self.selected.as_deref() == Some(old_name) {
            self.selected = Some(new_name);
        }

        let mut effects = self.render();
        effects.push(self.notify(Notification::info(
            "Project reconfigured",
            format!("Project '{old_name}' reconfigured."),
        )));
        effects
    }
}

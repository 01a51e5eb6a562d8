//! Three-state daemon controller.
//!
//! The machine starts in `Pending` and only leaves it on an authoritative
//! liveness answer. User requests to start or kill the daemon re-enter
//! `Pending` before the command is sent. `Running` and `Stopped` are never
//! adjacent: a liveness answer that flips one into the other is reported as
//! two transitions through `Pending`.

use fm_protocol::daemon_models::DaemonState;
use thiserror::Error;

/// Why the machine is waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingReason {
    Startup,
    StartingDaemon,
    KillingDaemon,
    /// A liveness answer contradicted the settled state.
    Confirming,
}

impl PendingReason {
    pub fn message(self) -> &'static str {
        match self {
            Self::Startup => "Loading state...",
            Self::StartingDaemon => "Starting daemon...",
            Self::KillingDaemon => "Killing daemon...",
            Self::Confirming => "Checking daemon status...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Hidden,
    /// Non-dismissible; carries the message to show.
    Blocking(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    Start,
    Stop,
    Unchanged,
}

/// What the presentation layer must do on entering a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateEffects {
    pub process_actions_enabled: bool,
    pub start_daemon_enabled: bool,
    pub kill_daemon_enabled: bool,
    pub overlay: Overlay,
    pub poll: PollCommand,
    /// Drop the live snapshot so every declared process shows as undeployed.
    pub clear_live_list: bool,
}

impl StateEffects {
    /// Effects of being in `state`.
    pub fn entering(state: DaemonState, reason: PendingReason) -> Self {
        match state {
            DaemonState::Pending => Self {
                process_actions_enabled: false,
                start_daemon_enabled: false,
                kill_daemon_enabled: false,
                overlay: Overlay::Blocking(reason.message().to_string()),
                poll: PollCommand::Unchanged,
                clear_live_list: false,
            },
            DaemonState::Running => Self {
                process_actions_enabled: true,
                start_daemon_enabled: false,
                kill_daemon_enabled: true,
                overlay: Overlay::Hidden,
                poll: PollCommand::Start,
                clear_live_list: false,
            },
            DaemonState::Stopped => Self {
                process_actions_enabled: false,
                start_daemon_enabled: true,
                kill_daemon_enabled: false,
                overlay: Overlay::Hidden,
                poll: PollCommand::Stop,
                clear_live_list: true,
            },
        }
    }
}

/// Side effects of moving from `from` to `to`; `None` for a same-state move.
pub fn transition_effects(
    from: DaemonState,
    to: DaemonState,
    reason: PendingReason,
) -> Option<StateEffects> {
    (from != to).then(|| StateEffects::entering(to, reason))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: DaemonState,
    pub to: DaemonState,
    pub effects: StateEffects,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Cannot start the daemon while it is {0}")]
    CannotStart(DaemonState),
    #[error("Cannot kill the daemon while it is {0}")]
    CannotKill(DaemonState),
}

#[derive(Debug, Clone)]
pub struct DaemonStateMachine {
    state: DaemonState,
    reason: PendingReason,
}

impl Default for DaemonStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl DaemonStateMachine {
    /// A machine in `Pending`, as at UI construction time.
    pub fn new() -> Self {
        Self {
            state: DaemonState::Pending,
            reason: PendingReason::Startup,
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    /// Effects of the current state, for presentation layers that redraw
    /// from scratch.
    pub fn current_effects(&self) -> StateEffects {
        StateEffects::entering(self.state, self.reason)
    }

    fn enter(&mut self, to: DaemonState, reason: PendingReason) -> Option<Transition> {
        let from = self.state;
        let effects = transition_effects(from, to, reason)?;
        self.state = to;
        self.reason = reason;
        tracing::info!(%from, %to, ?reason, "Daemon state changed");
        Some(Transition { from, to, effects })
    }

    /// Apply an authoritative liveness answer.
    ///
    /// # Returns
    ///
    /// The transitions taken, in order: none when the answer matches the
    /// current state, one out of `Pending`, or two when the answer flips a
    /// settled state.
    pub fn apply_liveness(&mut self, running: bool) -> Vec<Transition> {
        let target = DaemonState::from_liveness(running);
        let mut transitions = Vec::with_capacity(2);
        if self.state != target && self.state != DaemonState::Pending {
            transitions.extend(self.enter(DaemonState::Pending, PendingReason::Confirming));
        }
        transitions.extend(self.enter(target, self.reason));
        transitions
    }

    /// Enter `Pending` ahead of a start request. Only valid while stopped.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::CannotStart` from `Running` or `Pending`.
    pub fn request_start_daemon(&mut self) -> Result<Transition, TransitionError> {
        if self.state != DaemonState::Stopped {
            return Err(TransitionError::CannotStart(self.state));
        }
        self.enter(DaemonState::Pending, PendingReason::StartingDaemon)
            .ok_or(TransitionError::CannotStart(self.state))
    }

    /// Enter `Pending` ahead of a kill request.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::CannotKill` while already `Pending`.
    pub fn request_kill_daemon(&mut self) -> Result<Transition, TransitionError> {
        if self.state == DaemonState::Pending {
            return Err(TransitionError::CannotKill(self.state));
        }
        self.enter(DaemonState::Pending, PendingReason::KillingDaemon)
            .ok_or(TransitionError::CannotKill(self.state))
    }
}

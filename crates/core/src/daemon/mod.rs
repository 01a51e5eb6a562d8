//! Daemon state machine.

pub mod state_machine;

pub use state_machine::transition_effects;
pub use state_machine::DaemonStateMachine;
pub use state_machine::Overlay;
pub use state_machine::PendingReason;
pub use state_machine::PollCommand;
pub use state_machine::StateEffects;
pub use state_machine::Transition;
pub use state_machine::TransitionError;

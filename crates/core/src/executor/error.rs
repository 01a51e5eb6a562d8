//! Error taxonomy for supervisor interaction.

use thiserror::Error;

/// Failures that can occur while talking to the supervisor.
///
/// `TimedOut` is a flavour of `CommandFailed` for surfacing purposes.
/// `MalformedResponse` is always tolerated by callers and folded into an
/// empty result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FleetError {
    #[error("'{program}' command not found. Is it installed and in your PATH?")]
    ToolNotFound { program: String },

    #[error("Command failed: {command}\n\nOutput:\n{output}")]
    CommandFailed { command: String, output: String },

    #[error("Command timed out: {command}")]
    TimedOut { command: String },

    #[error("Malformed supervisor response: {0}")]
    MalformedResponse(String),

    #[error("Failed to write process descriptor: {0}")]
    Descriptor(String),
}

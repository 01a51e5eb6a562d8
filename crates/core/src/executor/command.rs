//! Command lines and their outcomes.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use crate::executor::error::FleetError;

/// Output text substituted for a command that never finished.
pub const TIMEOUT_SENTINEL: &str = "Command timed out.";

/// A program and its arguments.
///
/// Arguments are handed to the OS as-is; there is no shell in between, so
/// names containing spaces or quotes need no escaping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a filesystem path argument.
    pub fn path_arg(self, path: &Path) -> Self {
        let arg = path.as_os_str().to_string_lossy().into_owned();
        self.arg(arg)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> impl Iterator<Item = &OsStr> {
        self.args.iter().map(OsStr::new)
    }

    pub fn args_slice(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Outcome of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// Exit status zero; combined output.
    Success(String),
    /// The command ran but failed; combined output.
    Failure(String),
    /// The program itself is missing.
    NotFound,
    /// The command did not finish within its timeout.
    TimedOut,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Captured text, with a sentinel for timeouts and nothing for a missing tool.
    pub fn output(&self) -> &str {
        match self {
            Self::Success(output) | Self::Failure(output) => output,
            Self::TimedOut => TIMEOUT_SENTINEL,
            Self::NotFound => "",
        }
    }

    /// Map the outcome onto the error taxonomy.
    pub fn into_result(self, command: &CommandLine) -> Result<String, FleetError> {
        match self {
            Self::Success(output) => Ok(output),
            Self::Failure(output) => Err(FleetError::CommandFailed {
                command: command.to_string(),
                output,
            }),
            Self::NotFound => Err(FleetError::ToolNotFound {
                program: command.program().to_string(),
            }),
            Self::TimedOut => Err(FleetError::TimedOut {
                command: command.to_string(),
            }),
        }
    }
}

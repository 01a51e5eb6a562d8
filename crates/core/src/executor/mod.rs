//! External command execution.
//!
//! This module provides:
//! - [`CommandLine`]: a program plus arguments, never passed through a shell
//! - [`ProcessInvoker`]: the spawn-with-timeout capability, swappable in tests
//! - [`CommandExecutor`]: invocation plus the error-surfacing policy

pub mod cli_executor;
pub mod command;
pub mod error;
pub mod invoker;

pub use cli_executor::CommandExecutor;
pub use command::CommandLine;
pub use command::CommandResult;
pub use error::FleetError;
pub use invoker::ProcessInvoker;
pub use invoker::SystemInvoker;

//! # fm-core
//!
//! Fleet synchronization engine for fleet-monitor.
//!
//! This crate provides:
//! - A liveness probe that inspects the OS process table for the supervisor daemon
//! - A command executor with timeouts and failure classification
//! - The fleet client and its serialized worker loop
//! - Reconciliation of declared configurations against live snapshots
//! - The daemon state machine and the control-thread controller
//!
//! ## Modules
//!
//! - [`config`]: Application settings loading
//! - [`executor`]: External command invocation
//! - [`probe`]: Daemon liveness detection
//! - [`fleet`]: Supervisor query/control client and worker
//! - [`reconcile`]: Merge and diff of process views
//! - [`daemon`]: Daemon state machine
//! - [`store`]: Declared-configuration store
//! - [`controller`]: Control-thread session state
//! - [`format`]: Display helpers for uptime and memory figures
//! - [`telemetry`]: Logging setup

pub mod config;
pub mod controller;
pub mod daemon;
pub mod executor;
pub mod fleet;
pub mod format;
pub mod probe;
pub mod reconcile;
pub mod store;
pub mod telemetry;

//! # fm-protocol
//!
//! Shared data models for fleet-monitor.
//!
//! This crate defines every structure that crosses a layer boundary:
//! - Declared process configurations (what the user wants to run)
//! - Live process records (what the supervisor reports)
//! - The merged view the presentation layer renders
//! - Operations and Events exchanged between the control thread and the worker
//!
//! ## Modules
//!
//! - [`config_models`]: Declared process configuration
//! - [`process_models`]: Live records, statuses and merged views
//! - [`daemon_models`]: Supervisor daemon state
//! - [`ipc`]: Operations and Events for control-thread/worker communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs and chrono
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other fleet-monitor crates

pub mod config_models;
pub mod daemon_models;
pub mod ipc;
pub mod process_models;

// Re-export all public types for convenience
pub use config_models::*;
pub use daemon_models::*;
pub use ipc::*;
pub use process_models::*;

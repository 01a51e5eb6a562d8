//! Supervisor query/control client and its worker.
//!
//! - [`client`]: liveness-gated queries and control commands
//! - [`worker`]: the serialized loop that runs the client off the control thread
//! - [`snapshot`]: parsing of the supervisor's structured process list
//! - [`descriptor`]: the one-shot file used to start a declared process

pub mod client;
pub mod descriptor;
pub mod snapshot;
pub mod worker;

pub use client::FleetClient;
pub use client::InitialState;
pub use worker::spawn_worker;
pub use worker::FleetWorker;

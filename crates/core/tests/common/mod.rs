//! Common test utilities for the fleet engine integration tests.
//!
//! This module provides:
//! - Fixtures (declared configs, live records, snapshot JSON)
//! - A scripted process invoker that records every command line
//! - A scripted liveness probe with a call counter
//! - Event assertions

pub mod assertions;
pub mod fakes;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fakes::*;
#[allow(unused_imports)]
pub use fixtures::*;

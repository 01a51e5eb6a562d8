//! Application settings.
//!
//! This module provides functionality to load and validate the
//! `config.toml` file from the per-user configuration directory.

pub mod error;
pub mod loader;
pub mod models;

//! Error types for the declared-configuration store.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write project store at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize project store: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("A project named '{0}' already exists")]
    DuplicateName(String),

    #[error("No project named '{0}'")]
    NotFound(String),

    #[error("Project name must not be empty")]
    EmptyName,
}

pub type StoreResult<T> = Result<T, StoreError>;

//! Errors raised by the core crate

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid detection rules: {0}")]
    InvalidRules(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write report to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Error types for the reel simulation

use thiserror::Error;

/// Configuration loading/validation error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Command channel error. Never fatal; the message is logged and discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command: {0}")]
    Unknown(String),

    #[error("malformed command: {0}")]
    Malformed(String),

    #[error("step frames must be >= 1, got {0}")]
    InvalidStep(i64),
}

/// Snapshot serialization/write error
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
pub type CommandResult<T> = Result<T, CommandError>;
pub type SnapshotResult<T> = Result<T, SnapshotError>;

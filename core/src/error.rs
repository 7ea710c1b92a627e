//! Error types and handling for quickopen core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for quickopen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for quickopen core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Search invocation errors
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Errors reported by the host editor or widget
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for field '{field}': {value}")]
    InvalidValue { field: String, value: String },
}

/// Search tool errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to start {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("{program} not found on PATH")]
    ProgramNotFound { program: String },
}

/// Host collaborator errors
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Cannot open document {}: {message}", path.display())]
    OpenFailed { path: PathBuf, message: String },

    #[error("Cannot show document {}: {message}", path.display())]
    ShowFailed { path: PathBuf, message: String },

    #[error("Picker widget unavailable: {message}")]
    WidgetUnavailable { message: String },
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Generic(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Generic(msg.to_string())
    }
}

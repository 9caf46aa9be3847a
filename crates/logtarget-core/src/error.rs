//! Error types for LogTarget
//!
//! Logging itself never fails. These errors only come out of setup-time
//! operations: opening a file log, loading a configuration file, strict
//! level parsing and installing the process-wide sink.

use thiserror::Error;

/// Main error type for LogTarget setup operations
#[derive(Error, Debug)]
pub enum LogTargetError {
    /// A level token did not match any of the eight canonical levels
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    /// The process-wide sink already exists and cannot be replaced or rebuilt
    #[error("The global LogSink is already initialized")]
    AlreadyInitialized,

    /// Error during serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using LogTargetError
pub type LogTargetResult<T> = Result<T, LogTargetError>;

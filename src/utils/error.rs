//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised by the aggregation engine and its backends
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("profiling session has been shut down")]
    SessionShutDown,

    #[error("a batch is already in progress")]
    BatchInProgress,

    #[error("backend failure: {0}")]
    Backend(String),
}

/// Errors that can occur while parsing a recorded event stream
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid stream format: {0}")]
    InvalidFormat(String),

    #[error("unsupported schema version: {0}")]
    UnsupportedVersion(String),
}

/// Errors that can occur while fetching a stream over HTTP
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("stream not found at {0}")]
    NotFound(String),
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("empty stack data")]
    EmptyStacks,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("failed to read file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("invalid output path: {0}")]
    InvalidPath(String),
}

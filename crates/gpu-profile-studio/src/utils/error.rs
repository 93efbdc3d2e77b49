//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while querying the trace store
///
/// A query failure is terminal for the stage that issued it; it never
/// aborts the whole profiling request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("SQL query failed: {query}: {reason}")]
    Execution { query: String, reason: String },

    #[error("Query cancelled")]
    Cancelled,

    #[error("Query deadline exceeded")]
    DeadlineExceeded,

    #[error("Column {index} missing from result of: {query}")]
    MissingColumn { query: String, index: usize },

    #[error("Column {index} of `{query}` is not a {expected} column")]
    ColumnType {
        query: String,
        index: usize,
        expected: &'static str,
    },

    #[error("Column {index} of `{query}` has {actual} rows, expected {expected}")]
    ColumnLength {
        query: String,
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Errors that can occur while computing derived GPU counters
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("No GPU slices available to compute counters from")]
    MissingSlices,

    #[error("Counter track {0} has mismatched timestamp and value series")]
    MalformedCounter(u32),
}

/// Errors that can occur while loading a capture snapshot
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read capture snapshot: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Invalid capture snapshot: {0}")]
    InvalidFormat(#[from] serde_json::Error),
}

/// Errors that can occur while loading profiler configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    ParseFailed(#[from] toml::de::Error),

    #[error("Invalid profiler configuration: {0}")]
    Invalid(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

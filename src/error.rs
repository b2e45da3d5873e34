use thiserror::Error;

/// Hard failures of a parse call. Malformed lines never end up here; they
/// degrade to less specific records instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No log content supplied (empty input)")]
    EmptyInput,

    #[error("Input too large: {size} bytes (max: {limit} bytes)")]
    InputTooLarge { size: u64, limit: u64 },

    #[error("Failed to read log file: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected filter arguments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid timestamp bound: '{0}'")]
    InvalidTimestamp(String),

    #[error("Invalid level filter: '{0}'")]
    InvalidLevel(String),
}

//! Error types for the Glue metrics pipeline.

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("configuration validation failed: {0}")]
    ConfigValidation(String),

    // Input errors (20-29)
    #[error("invalid invocation event: {0}")]
    InvalidEvent(String),

    // Transform errors (30-39)
    #[error("record transform failed: {0}")]
    Transform(String),

    #[error("malformed record {record_id}: {reason}")]
    MalformedRecord { record_id: String, reason: String },

    // Catalog errors (40-49)
    #[error("catalog error: {0}")]
    Catalog(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Runtime errors (70-79)
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::ConfigValidation(_) => 11,
            Error::InvalidEvent(_) => 20,
            Error::Transform(_) => 30,
            Error::MalformedRecord { .. } => 31,
            Error::Catalog(_) => 40,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
            Error::Runtime(_) => 70,
        }
    }
}

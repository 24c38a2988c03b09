//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid time zone '{0}': expected local, utc, or an offset like +09:00")]
    InvalidTimeZone(String),

    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },
}

impl From<ConfigError> for gm_common::Error {
    fn from(err: ConfigError) -> Self {
        gm_common::Error::Config(err.to_string())
    }
}

//! Pipeline configuration types.
//!
//! One file configures the transformer, the catalog contract and the
//! delivery-side constants that must agree with it. Every section has
//! defaults, so an empty document is a valid configuration.

use chrono::FixedOffset;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    pub transform: TransformConfig,
    pub catalog: CatalogConfig,
    pub delivery: DeliveryConfig,
    pub logging: LoggingConfig,
}

impl PipelineConfig {
    /// Parse a YAML (or JSON) configuration document.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::Parse)
    }

    /// Load a configuration file from disk.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }
}

/// Record transformer settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TransformConfig {
    /// Zone used to derive year/month/day/hour partitions from event
    /// timestamps: `local`, `utc`, or a fixed offset such as `+09:00`.
    #[schemars(with = "String")]
    pub time_zone: TimeZoneMode,
}

/// Zone semantics for partition calendar fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimeZoneMode {
    /// The process's local zone (honours `TZ`).
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
}

impl FromStr for TimeZoneMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(TimeZoneMode::Local),
            "utc" | "z" | "+00:00" => Ok(TimeZoneMode::Utc),
            other => other
                .parse::<FixedOffset>()
                .map(TimeZoneMode::Fixed)
                .map_err(|_| ConfigError::InvalidTimeZone(s.to_string())),
        }
    }
}

impl TryFrom<String> for TimeZoneMode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeZoneMode> for String {
    fn from(mode: TimeZoneMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for TimeZoneMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneMode::Local => write!(f, "local"),
            TimeZoneMode::Utc => write!(f, "utc"),
            TimeZoneMode::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

/// Catalog table the crawler maintains over delivered objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CatalogConfig {
    /// Bucket holding delivered objects. Required to render the table
    /// location.
    pub bucket_name: Option<String>,
    pub database_name: String,
    pub table_name: String,
    pub crawler_name: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            bucket_name: None,
            database_name: "glue_observability".to_string(),
            table_name: "metrics".to_string(),
            crawler_name: "glue-observability-crawler".to_string(),
        }
    }
}

/// Delivery pipeline constants that must agree with the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Object prefix under which partitioned data is written.
    pub data_prefix: String,
    /// Object prefix for records the pipeline could not deliver.
    pub error_prefix: String,
    /// Retries the delivery pipeline makes before redirecting a failed
    /// batch to the error prefix.
    pub processor_retries: u32,
    pub lambda_buffer_size_mb: u32,
    pub lambda_buffer_interval_secs: u32,
    pub s3_buffer_size_mb: u32,
    pub s3_buffer_interval_secs: u32,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            data_prefix: "data/".to_string(),
            error_prefix: "error/".to_string(),
            processor_retries: 3,
            lambda_buffer_size_mb: 1,
            lambda_buffer_interval_secs: 60,
            s3_buffer_size_mb: 64,
            s3_buffer_interval_secs: 60,
        }
    }
}

/// Structured log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => Err(ConfigError::InvalidValue {
                field: "logging.format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging settings. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct LoggingConfig {
    /// Unset means JSON under the Lambda runtime and pretty text for
    /// local commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<LogFormat>,
    pub level: String,
}

impl LoggingConfig {
    /// Configured format, or `fallback` when none was set.
    pub fn format_or(&self, fallback: LogFormat) -> LogFormat {
        self.format.unwrap_or(fallback)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: None,
            level: "info".to_string(),
        }
    }
}

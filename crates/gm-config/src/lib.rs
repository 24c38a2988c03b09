//! Glue metrics pipeline configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for the pipeline configuration file
//! - Config resolution (CLI → env → config dir → defaults)
//! - Semantic validation
//! - JSON Schema export for the configuration file

pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod validate;

pub use error::ConfigError;
pub use pipeline::{
    CatalogConfig, DeliveryConfig, LogFormat, LoggingConfig, PipelineConfig, TimeZoneMode,
    TransformConfig,
};
pub use resolve::{resolve_config, ConfigPaths, ConfigSource, ResolvedConfig};
pub use validate::{validate, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Render the JSON Schema describing the configuration file.
pub fn config_schema() -> serde_json::Value {
    let schema = schemars::schema_for!(PipelineConfig);
    serde_json::to_value(&schema).unwrap_or(serde_json::Value::Null)
}

//! Semantic validation for pipeline configuration.
//!
//! Parsing only guarantees shape; these checks catch values the delivery
//! pipeline or catalog would reject at deploy time.

use serde::Serialize;

use crate::pipeline::PipelineConfig;

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors block use of the config; warnings are advisory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a configuration.
pub fn validate(config: &PipelineConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if let Some(bucket) = &config.catalog.bucket_name {
        if let Err(message) = check_bucket_name(bucket) {
            result
                .errors
                .push(ValidationError::new("catalog.bucket_name", message));
        }
    }
    for (field, value) in [
        ("catalog.database_name", &config.catalog.database_name),
        ("catalog.table_name", &config.catalog.table_name),
    ] {
        if let Err(message) = check_catalog_identifier(value) {
            result.errors.push(ValidationError::new(field, message));
        }
    }
    if config.catalog.crawler_name.trim().is_empty() {
        result
            .errors
            .push(ValidationError::new("catalog.crawler_name", "must not be empty"));
    }

    let delivery = &config.delivery;
    for (field, value) in [
        ("delivery.data_prefix", &delivery.data_prefix),
        ("delivery.error_prefix", &delivery.error_prefix),
    ] {
        if let Err(message) = check_prefix(value) {
            result.errors.push(ValidationError::new(field, message));
        }
    }
    if delivery.data_prefix == delivery.error_prefix {
        result.errors.push(ValidationError::new(
            "delivery.error_prefix",
            "must differ from delivery.data_prefix",
        ));
    }

    if delivery.processor_retries > 3 {
        result.errors.push(ValidationError::new(
            "delivery.processor_retries",
            "must be at most 3",
        ));
    }

    if !(1..=3).contains(&delivery.lambda_buffer_size_mb) {
        result.warnings.push(ValidationError::new(
            "delivery.lambda_buffer_size_mb",
            "outside the 1-3 MB range the delivery pipeline accepts",
        ));
    }
    if !(60..=900).contains(&delivery.lambda_buffer_interval_secs) {
        result.warnings.push(ValidationError::new(
            "delivery.lambda_buffer_interval_secs",
            "outside the 60-900 s range the delivery pipeline accepts",
        ));
    }
    if !(1..=128).contains(&delivery.s3_buffer_size_mb) {
        result.warnings.push(ValidationError::new(
            "delivery.s3_buffer_size_mb",
            "outside the 1-128 MB range the delivery pipeline accepts",
        ));
    }
    if delivery.s3_buffer_interval_secs > 900 {
        result.warnings.push(ValidationError::new(
            "delivery.s3_buffer_interval_secs",
            "above the 900 s maximum the delivery pipeline accepts",
        ));
    }

    if config.logging.level.parse::<tracing::Level>().is_err() {
        result.errors.push(ValidationError::new(
            "logging.level",
            format!("unknown level '{}'", config.logging.level),
        ));
    }

    result
}

fn check_bucket_name(name: &str) -> Result<(), String> {
    if !(3..=63).contains(&name.len()) {
        return Err("must be 3-63 characters".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err("may only contain lowercase letters, digits, '.' and '-'".to_string());
    }
    let first = name.chars().next();
    let last = name.chars().last();
    if !first.is_some_and(|c| c.is_ascii_alphanumeric())
        || !last.is_some_and(|c| c.is_ascii_alphanumeric())
    {
        return Err("must begin and end with a letter or digit".to_string());
    }
    Ok(())
}

fn check_catalog_identifier(name: &str) -> Result<(), String> {
    if name.is_empty() || name.len() > 255 {
        return Err("must be 1-255 characters".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err("may only contain lowercase letters, digits and '_'".to_string());
    }
    Ok(())
}

fn check_prefix(prefix: &str) -> Result<(), String> {
    if prefix.is_empty() {
        return Err("must not be empty".to_string());
    }
    if prefix.starts_with('/') {
        return Err("must be relative to the bucket root".to_string());
    }
    if !prefix.ends_with('/') {
        return Err("must end with '/'".to_string());
    }
    Ok(())
}

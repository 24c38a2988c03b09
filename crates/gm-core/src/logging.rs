//! Tracing subscriber setup.

use gm_common::{Error, Result};
use gm_config::{LogFormat, LoggingConfig};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Filter directive for the configured level, raised by `-v` flags.
///
/// Flags never lower a configured level that is already more verbose.
pub fn filter_directive(config: &LoggingConfig, verbosity: u8) -> String {
    let (flag_level, directive) = match verbosity {
        0 => return config.level.clone(),
        1 => (Level::DEBUG, "debug"),
        _ => (Level::TRACE, "trace"),
    };
    match config.level.parse::<Level>() {
        Ok(configured) if configured > flag_level => config.level.clone(),
        _ => directive.to_string(),
    }
}

/// Install the global subscriber. Logs go to stderr; `RUST_LOG` wins over
/// the configured level. `fallback` applies when no format is configured.
pub fn init_logging(config: &LoggingConfig, verbosity: u8, fallback: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config, verbosity)));

    let installed = match config.format_or(fallback) {
        // CloudWatch stamps ingestion time on every line.
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    installed.map_err(|e| Error::Runtime(format!("failed to install log subscriber: {e}")))
}

//! Configuration resolution.
//!
//! Precedence, first match wins for the file:
//! 1. `--config <path>` on the command line
//! 2. `GM_CONFIG` environment variable
//! 3. `<config_dir>/gm-pipeline/config.yaml`
//! 4. Built-in defaults
//!
//! Explicitly named files must exist; a missing file in the config
//! directory falls back to defaults. Environment overrides are applied on
//! top of whichever source won.

use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use crate::error::ConfigError;
use crate::pipeline::{LogFormat, PipelineConfig, TimeZoneMode};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "GM_CONFIG";

/// Overrides `transform.time_zone`.
pub const TIME_ZONE_ENV_VAR: &str = "GM_TIME_ZONE";

/// Overrides `logging.format`.
pub const LOG_FORMAT_ENV_VAR: &str = "GM_LOG_FORMAT";

/// Overrides `logging.level`.
pub const LOG_LEVEL_ENV_VAR: &str = "GM_LOG_LEVEL";

const CONFIG_DIR_NAME: &str = "gm-pipeline";
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Candidate locations for the configuration file.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Path given on the command line.
    pub explicit: Option<PathBuf>,
    /// Path from `GM_CONFIG`.
    pub env: Option<PathBuf>,
    /// Per-user config directory.
    pub config_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover candidate paths from the process environment.
    pub fn discover(explicit: Option<PathBuf>) -> Self {
        Self {
            explicit,
            env: std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from),
            config_dir: dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME)),
        }
    }

    fn dir_file(&self) -> Option<PathBuf> {
        self.config_dir.as_ref().map(|dir| dir.join(CONFIG_FILE_NAME))
    }
}

/// Where the resolved configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    Cli(PathBuf),
    Env(PathBuf),
    ConfigDir(PathBuf),
    Defaults,
}

/// A configuration together with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    pub config: PipelineConfig,
    pub source: ConfigSource,
    /// Environment variables that overrode file values.
    pub overrides: Vec<String>,
}

/// Resolve configuration using the process environment for overrides.
pub fn resolve_config(paths: &ConfigPaths) -> Result<ResolvedConfig, ConfigError> {
    resolve_with(paths, |key| std::env::var(key).ok())
}

/// Resolve configuration with an explicit environment lookup.
pub fn resolve_with<F>(paths: &ConfigPaths, lookup: F) -> Result<ResolvedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, source) = load_source(paths)?;
    debug!(source = ?source, "configuration source selected");

    let overrides = apply_overrides(&mut config, lookup)?;
    Ok(ResolvedConfig {
        config,
        source,
        overrides,
    })
}

fn load_source(paths: &ConfigPaths) -> Result<(PipelineConfig, ConfigSource), ConfigError> {
    if let Some(path) = &paths.explicit {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.clone()));
        }
        let config = PipelineConfig::load_from_file(path)?;
        return Ok((config, ConfigSource::Cli(path.clone())));
    }

    if let Some(path) = &paths.env {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.clone()));
        }
        let config = PipelineConfig::load_from_file(path)?;
        return Ok((config, ConfigSource::Env(path.clone())));
    }

    if let Some(path) = paths.dir_file() {
        if path.is_file() {
            let config = PipelineConfig::load_from_file(&path)?;
            return Ok((config, ConfigSource::ConfigDir(path)));
        }
    }

    Ok((PipelineConfig::default(), ConfigSource::Defaults))
}

fn apply_overrides<F>(config: &mut PipelineConfig, lookup: F) -> Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = Vec::new();

    if let Some(value) = lookup(TIME_ZONE_ENV_VAR) {
        config.transform.time_zone = value.parse::<TimeZoneMode>()?;
        applied.push(TIME_ZONE_ENV_VAR.to_string());
    }
    if let Some(value) = lookup(LOG_FORMAT_ENV_VAR) {
        config.logging.format = Some(value.parse::<LogFormat>()?);
        applied.push(LOG_FORMAT_ENV_VAR.to_string());
    }
    if let Some(value) = lookup(LOG_LEVEL_ENV_VAR) {
        config.logging.level = value;
        applied.push(LOG_LEVEL_ENV_VAR.to_string());
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn test_defaults_when_nothing_configured() {
        let dir = TempDir::new().expect("tempdir");
        let paths = ConfigPaths {
            config_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let resolved = resolve_with(&paths, no_env).unwrap();
        assert_eq!(resolved.source, ConfigSource::Defaults);
        assert_eq!(resolved.config, PipelineConfig::default());
        assert!(resolved.overrides.is_empty());
    }

    #[test]
    fn test_explicit_path_wins_over_env_path() {
        let dir = TempDir::new().expect("tempdir");
        let cli = write_config(&dir, "cli.yaml", "catalog:\n  table_name: from_cli\n");
        let env = write_config(&dir, "env.yaml", "catalog:\n  table_name: from_env\n");
        let paths = ConfigPaths {
            explicit: Some(cli.clone()),
            env: Some(env),
            config_dir: None,
        };
        let resolved = resolve_with(&paths, no_env).unwrap();
        assert_eq!(resolved.source, ConfigSource::Cli(cli));
        assert_eq!(resolved.config.catalog.table_name, "from_cli");
    }

    #[test]
    fn test_config_dir_file_is_used() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_config(&dir, CONFIG_FILE_NAME, "catalog:\n  table_name: from_dir\n");
        let paths = ConfigPaths {
            config_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let resolved = resolve_with(&paths, no_env).unwrap();
        assert_eq!(resolved.source, ConfigSource::ConfigDir(path));
        assert_eq!(resolved.config.catalog.table_name, "from_dir");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let paths = ConfigPaths {
            explicit: Some(PathBuf::from("/nonexistent/gm/config.yaml")),
            ..Default::default()
        };
        let err = resolve_with(&paths, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_env_overrides_apply_after_file() {
        let dir = TempDir::new().expect("tempdir");
        let cli = write_config(&dir, "cli.yaml", "transform:\n  time_zone: local\n");
        let paths = ConfigPaths {
            explicit: Some(cli),
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [(TIME_ZONE_ENV_VAR, "utc"), (LOG_LEVEL_ENV_VAR, "debug")]
            .into_iter()
            .collect();
        let resolved = resolve_with(&paths, |key| env.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(resolved.config.transform.time_zone, TimeZoneMode::Utc);
        assert_eq!(resolved.config.logging.level, "debug");
        assert_eq!(
            resolved.overrides,
            vec![TIME_ZONE_ENV_VAR.to_string(), LOG_LEVEL_ENV_VAR.to_string()]
        );
    }

    #[test]
    fn test_invalid_override_is_an_error() {
        let paths = ConfigPaths::default();
        let err = resolve_with(&paths, |key| {
            (key == LOG_FORMAT_ENV_VAR).then(|| "xml".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}

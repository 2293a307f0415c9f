//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ConfigError;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Crawler executable settings.
    #[serde(default)]
    pub spider: SpiderConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spider.executable.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "spider.executable cannot be empty".to_string(),
            });
        }

        if self.spider.timeout_secs == Some(0) {
            return Err(ConfigError::ValidationError {
                message: "spider.timeout_secs must be greater than zero (use null to disable)"
                    .to_string(),
            });
        }

        Ok(())
    }
}

/// Settings for the external crawler executable.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpiderConfig {
    /// Name or path of the crawler executable.
    /// Default: `screamingfrogseospider`
    #[serde(default = "default_executable")]
    pub executable: String,

    /// Maximum run time of a single crawl or export, in seconds.
    /// `null` waits indefinitely. Default: 21600 (6 hours)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,

    /// Directory holding the crawler's stored crawl databases.
    /// Default: `~/.ScreamingFrogSEOSpider/ProjectInstanceData`
    #[serde(default)]
    pub project_data_dir: Option<PathBuf>,
}

impl Default for SpiderConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            timeout_secs: default_timeout_secs(),
            project_data_dir: None,
        }
    }
}

fn default_executable() -> String {
    crate::spider::DEFAULT_EXECUTABLE.to_string()
}

#[allow(clippy::unnecessary_wraps)] // serde default must match the field type
const fn default_timeout_secs() -> Option<u64> {
    Some(6 * 60 * 60)
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

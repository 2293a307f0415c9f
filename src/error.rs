//! Error types for xenopus-mcp.
//!
//! Crawler process outcomes (missing executable, non-zero exit) are not
//! errors here: they are reported to the caller as values, see
//! [`crate::spider::Outcome`]. These types cover configuration and the
//! filesystem work done around a crawler run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Filesystem errors raised around crawler invocations.
#[derive(Error, Debug)]
pub enum SpiderError {
    /// The crawler's project data directory does not exist.
    #[error("crawl database directory not found: {path}")]
    ProjectDataNotFound {
        /// Directory that was expected to hold stored crawls.
        path: PathBuf,
    },

    /// The crawler's project data directory could not be listed.
    #[error("failed to list crawl database directory: {path}")]
    ProjectDataRead {
        /// Directory being listed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The home directory of the current user could not be determined.
    #[error("unable to determine the home directory")]
    NoHomeDir,

    /// The export output folder could not be created.
    #[error("failed to create output folder: {path}")]
    OutputFolder {
        /// Folder that was being created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn project_data_not_found_names_path() {
        let error = SpiderError::ProjectDataNotFound {
            path: PathBuf::from("/home/me/.ScreamingFrogSEOSpider/ProjectInstanceData"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("ProjectInstanceData"));
    }

    #[test]
    fn output_folder_error_keeps_source() {
        use std::error::Error as _;

        let error = SpiderError::OutputFolder {
            path: PathBuf::from("/readonly/out"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(error.to_string().contains("/readonly/out"));
        assert!(error.source().is_some());
    }
}

//! Driving the Screaming Frog SEO Spider command-line interface.
//!
//! A tool call flows through three stages:
//!
//! 1. [`command`] turns the request into an argument vector
//! 2. [`invoker`] runs it and classifies how the process ended
//! 3. [`response`] maps that to the status dictionary returned to the caller
//!
//! [`reference`] holds the identifier tables and the stored-crawl listing
//! used for discovery.

pub mod command;
pub mod invoker;
pub mod reference;
pub mod response;

pub use command::{CrawlRequest, ExportRequest, ExportSelection, SpiderCommand};
pub use invoker::Outcome;
pub use response::{SpiderResponse, Status, Subject};

use std::path::PathBuf;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::SpiderConfig;
use crate::error::SpiderError;

/// Executable name used when none is configured.
pub const DEFAULT_EXECUTABLE: &str = "screamingfrogseospider";

/// Runs crawls and exports against one crawler installation.
#[derive(Debug, Clone)]
pub struct Spider {
    executable: String,
    timeout: Option<Duration>,
    project_data_dir: Option<PathBuf>,
}

impl Spider {
    /// Creates a runner for `executable` with no timeout and the default
    /// project data directory.
    #[must_use]
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            timeout: None,
            project_data_dir: None,
        }
    }

    /// Creates a runner from the `spider` section of the configuration.
    #[must_use]
    pub fn from_config(config: &SpiderConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            project_data_dir: config.project_data_dir.clone(),
        }
    }

    /// Sets the maximum run time of a single invocation.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the directory holding stored crawls.
    #[must_use]
    pub fn with_project_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_data_dir = Some(dir.into());
        self
    }

    /// The configured executable.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Starts a fresh crawl of `request.domain` and waits for it to finish.
    pub async fn domain_crawl(&self, request: &CrawlRequest) -> SpiderResponse {
        info!(domain = %request.domain, "Received request to crawl domain");
        debug!(
            business_name = %request.business_name,
            config = %request.config,
            "Crawl metadata"
        );

        let command = SpiderCommand::crawl(&self.executable, request);
        let outcome = invoker::run(&command, self.timeout).await;
        if matches!(outcome, Outcome::Success { .. }) {
            info!(domain = %request.domain, "Crawl completed successfully");
        }

        SpiderResponse::from_outcome(
            Subject::Domain(request.domain.clone()),
            outcome,
            &self.executable,
        )
    }

    /// Reloads `request.crawl_file` and writes the selected exports.
    ///
    /// The output folder is created first, including missing parents.
    pub async fn post_crawl_export(&self, request: &ExportRequest) -> SpiderResponse {
        info!(crawl_file = %request.crawl_file, "Received request to export data from crawl file");
        let subject = Subject::CrawlFile(request.crawl_file.clone());

        let output_dir = request.output_dir();
        if let Err(source) = tokio::fs::create_dir_all(&output_dir).await {
            let error = SpiderError::OutputFolder {
                path: output_dir,
                source,
            };
            tracing::error!(error = %error, "Cannot prepare export folder");
            return SpiderResponse::from_error(subject, &error);
        }

        let command = SpiderCommand::export(&self.executable, request, &output_dir);
        let outcome = invoker::run(&command, self.timeout).await;
        if matches!(outcome, Outcome::Success { .. }) {
            info!(crawl_file = %request.crawl_file, "Data export completed successfully");
        }

        SpiderResponse::from_outcome(subject, outcome, &self.executable)
    }

    /// Directory holding the crawler's stored crawls.
    ///
    /// # Errors
    ///
    /// Returns [`SpiderError::NoHomeDir`] if no directory is configured and
    /// the home directory is unknown.
    pub fn project_data_dir(&self) -> Result<PathBuf, SpiderError> {
        match &self.project_data_dir {
            Some(dir) => Ok(dir.clone()),
            None => reference::default_project_data_dir().ok_or(SpiderError::NoHomeDir),
        }
    }

    /// `{"database-ids": [...]}` for the stored crawls.
    ///
    /// # Errors
    ///
    /// Returns an error if the project data directory is missing or cannot
    /// be listed.
    pub async fn database_id_list(&self) -> Result<Value, SpiderError> {
        let dir = self.project_data_dir()?;
        let ids = reference::list_database_ids(&dir).await?;
        debug!(dir = %dir.display(), count = ids.len(), "Listed crawl databases");
        Ok(json!({ "database-ids": ids }))
    }
}

impl Default for Spider {
    fn default() -> Self {
        Self::from_config(&SpiderConfig::default())
    }
}

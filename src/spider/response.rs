//! The status dictionary returned from every crawler tool.
//!
//! Every response echoes the caller's primary input back under its own key
//! (`domain` or `crawl_file`), so callers can match responses to requests
//! without tracking ids.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::SpiderError;
use crate::spider::invoker::Outcome;

/// Whether the call succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The crawler exited with code zero.
    Success,
    /// Anything else.
    Error,
}

impl Status {
    /// The wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// The input a response refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// A fresh crawl of this domain.
    Domain(String),
    /// An export from this stored crawl.
    CrawlFile(String),
}

impl Subject {
    /// Response key the value is echoed under.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain",
            Self::CrawlFile(_) => "crawl_file",
        }
    }

    /// The caller's original value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Domain(v) | Self::CrawlFile(v) => v,
        }
    }

    const fn success_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "Crawl completed.",
            Self::CrawlFile(_) => "Data export completed.",
        }
    }

    fn failure_prefix(&self) -> String {
        match self {
            Self::Domain(domain) => format!("Error running Screaming Frog for domain {domain}."),
            Self::CrawlFile(file) => format!("Error exporting data from {file}."),
        }
    }
}

/// A tool response: `{status, <key>: <value>, message, details?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiderResponse {
    /// Success or error.
    pub status: Status,
    /// The request this answers.
    pub subject: Subject,
    /// Human-readable summary.
    pub message: String,
    /// Diagnostic text, usually the crawler's stderr.
    pub details: Option<String>,
}

impl SpiderResponse {
    /// Maps a crawler outcome to a response.
    ///
    /// `executable` is named in the message when it could not be found.
    #[must_use]
    pub fn from_outcome(subject: Subject, outcome: Outcome, executable: &str) -> Self {
        match outcome {
            Outcome::Success { .. } => Self {
                status: Status::Success,
                message: subject.success_message().to_string(),
                subject,
                details: None,
            },
            Outcome::NotFound => Self::error(
                subject,
                format!(
                    "Error: '{executable}' command not found. \
                     Ensure it is installed and in the system's PATH."
                ),
                None,
            ),
            Outcome::Failed {
                exit_code, stderr, ..
            } => {
                let message = format!("{} Return code: {exit_code}", subject.failure_prefix());
                Self::error(subject, message, Some(stderr))
            }
            Outcome::TimedOut { after } => {
                let message = format!(
                    "{} Timed out after {} seconds.",
                    subject.failure_prefix(),
                    after.as_secs()
                );
                Self::error(subject, message, None)
            }
            Outcome::SpawnFailed { message } => Self::error(
                subject,
                format!("Error: failed to start '{executable}'."),
                Some(message),
            ),
        }
    }

    /// Maps a filesystem error raised before the crawler ran.
    #[must_use]
    pub fn from_error(subject: Subject, error: &SpiderError) -> Self {
        let details = std::error::Error::source(error).map(ToString::to_string);
        Self::error(subject, format!("Error: {error}"), details)
    }

    fn error(subject: Subject, message: String, details: Option<String>) -> Self {
        Self {
            status: Status::Error,
            subject,
            message,
            details,
        }
    }

    /// Whether this is an error response.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }
}

impl Serialize for SpiderResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.details.is_some() { 4 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("status", self.status.as_str())?;
        map.serialize_entry(self.subject.key(), self.subject.value())?;
        map.serialize_entry("message", &self.message)?;
        if let Some(details) = &self.details {
            map.serialize_entry("details", details)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    const EXE: &str = "screamingfrogseospider";

    #[test]
    fn crawl_success() {
        let response = SpiderResponse::from_outcome(
            Subject::Domain("example.com".to_string()),
            Outcome::Success {
                stdout: "lots of output".to_string(),
            },
            EXE,
        );

        assert!(!response.is_error());
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "success",
                "domain": "example.com",
                "message": "Crawl completed.",
            })
        );
    }

    #[test]
    fn export_success_echoes_crawl_file() {
        let file = "/home/me/crawls/site crawl.seospider";
        let response = SpiderResponse::from_outcome(
            Subject::CrawlFile(file.to_string()),
            Outcome::Success {
                stdout: String::new(),
            },
            EXE,
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["crawl_file"], file);
        assert_eq!(value["message"], "Data export completed.");
        assert!(value.get("domain").is_none());
    }

    #[test]
    fn not_found_names_executable() {
        let response = SpiderResponse::from_outcome(
            Subject::Domain("example.com".to_string()),
            Outcome::NotFound,
            EXE,
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["domain"], "example.com");
        let message = value["message"].as_str().unwrap();
        assert!(message.contains("not found"));
        assert!(message.contains(EXE));
        assert!(value.get("details").is_none());
    }

    #[test]
    fn failure_carries_exit_code_and_stderr() {
        let response = SpiderResponse::from_outcome(
            Subject::CrawlFile("/c/crawl.seospider".to_string()),
            Outcome::Failed {
                exit_code: 2,
                stdout: "ignored".to_string(),
                stderr: "Unknown export tab".to_string(),
            },
            EXE,
        );
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(
            value["message"],
            "Error exporting data from /c/crawl.seospider. Return code: 2"
        );
        assert_eq!(value["details"], "Unknown export tab");
    }

    #[test]
    fn timeout_is_error() {
        let response = SpiderResponse::from_outcome(
            Subject::Domain("example.com".to_string()),
            Outcome::TimedOut {
                after: Duration::from_secs(90),
            },
            EXE,
        );

        assert!(response.is_error());
        assert!(response.message.contains("Timed out after 90 seconds"));
    }

    #[test]
    fn filesystem_error_has_details() {
        let error = SpiderError::OutputFolder {
            path: PathBuf::from("/ro/out"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let response =
            SpiderResponse::from_error(Subject::CrawlFile("/ro/crawl.seospider".into()), &error);

        assert!(response.is_error());
        assert!(response.message.contains("/ro/out"));
        assert!(response.details.is_some());
    }
}

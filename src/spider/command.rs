//! Command-line construction for the crawler executable.
//!
//! Requests are turned into an argument vector that is handed to the OS
//! as-is. Nothing here goes through a shell, so identifiers containing
//! spaces or colons (`"Response Codes:Client Error (4xx)"`) stay single
//! tokens.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Output folder used by a new crawl when the caller gives none.
pub const DEFAULT_CRAWL_OUTPUT_FOLDER: &str = "exports";

/// Output folder used by a post-crawl export when the caller gives none.
/// Relative values are resolved against the crawl file's directory.
pub const DEFAULT_EXPORT_OUTPUT_FOLDER: &str = "postcrawl-exports";

const DEFAULT_BUSINESS_NAME: &str = "default_business_name";
const DEFAULT_CRAWL_CONFIG: &str = "default.seospider";

/// The export selectors shared by both request kinds.
///
/// Identifiers are passed through unvalidated; the crawler rejects names
/// it does not know.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExportSelection {
    /// Tab exports, e.g. `"Internal:All"`.
    #[serde(default)]
    pub export_tabs: Vec<String>,
    /// Bulk exports, e.g. `"Links:All Inlinks"`.
    #[serde(default)]
    pub bulk_exports: Vec<String>,
    /// Reports, e.g. `"Crawl Overview"`.
    #[serde(default)]
    pub reports: Vec<String>,
}

impl ExportSelection {
    /// Appends one flag per non-empty selector group, each followed by its
    /// identifiers in caller order.
    fn append_to(&self, args: &mut Vec<String>) {
        let groups = [
            ("--export-tabs", &self.export_tabs),
            ("--bulk-export", &self.bulk_exports),
            ("--save-report", &self.reports),
        ];

        for (flag, ids) in groups {
            if ids.is_empty() {
                continue;
            }
            args.push(flag.to_string());
            args.extend(ids.iter().cloned());
        }
    }
}

/// Arguments of the `domain_crawl` tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CrawlRequest {
    /// Domain or start URL handed to `--crawl`.
    pub domain: String,

    /// Exports to write once the crawl finishes.
    #[serde(flatten)]
    pub selection: ExportSelection,

    /// Folder the crawler writes its exports into.
    #[serde(default = "default_crawl_output_folder")]
    pub output_folder: String,

    /// Label for the client the crawl is run for. Not passed to the crawler.
    #[serde(default = "default_business_name")]
    pub business_name: String,

    /// Crawl configuration file name. Not passed to the crawler.
    #[serde(default = "default_crawl_config")]
    pub config: String,
}

impl CrawlRequest {
    /// Creates a request for `domain` with no exports and default folders.
    #[must_use]
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            selection: ExportSelection::default(),
            output_folder: default_crawl_output_folder(),
            business_name: default_business_name(),
            config: default_crawl_config(),
        }
    }
}

/// Arguments of the `post_crawl_export` tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExportRequest {
    /// Stored crawl handed to `--load-crawl`.
    pub crawl_file: String,

    /// Exports to write from the loaded crawl.
    #[serde(flatten)]
    pub selection: ExportSelection,

    /// Output folder, relative to the crawl file's directory unless absolute.
    #[serde(default = "default_export_output_folder")]
    pub output_folder: String,
}

impl ExportRequest {
    /// Creates a request for `crawl_file` with no exports and the default
    /// output folder.
    #[must_use]
    pub fn new(crawl_file: impl Into<String>) -> Self {
        Self {
            crawl_file: crawl_file.into(),
            selection: ExportSelection::default(),
            output_folder: default_export_output_folder(),
        }
    }

    /// Directory the export is written to.
    ///
    /// See [`resolve_export_output_folder`].
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        resolve_export_output_folder(&self.crawl_file, &self.output_folder)
    }
}

fn default_crawl_output_folder() -> String {
    DEFAULT_CRAWL_OUTPUT_FOLDER.to_string()
}

fn default_export_output_folder() -> String {
    DEFAULT_EXPORT_OUTPUT_FOLDER.to_string()
}

fn default_business_name() -> String {
    DEFAULT_BUSINESS_NAME.to_string()
}

fn default_crawl_config() -> String {
    DEFAULT_CRAWL_CONFIG.to_string()
}

/// Joins `output_folder` onto the directory containing `crawl_file`.
///
/// An absolute `output_folder` replaces the base entirely. A crawl file
/// without a directory component leaves `output_folder` unchanged.
#[must_use]
pub fn resolve_export_output_folder(crawl_file: &str, output_folder: &str) -> PathBuf {
    Path::new(directory_component(crawl_file)).join(output_folder)
}

/// Everything before the last separator, with trailing separators removed
/// unless only the root is left.
///
/// Unlike [`Path::parent`], a trailing separator is significant:
/// `crawls/site/` yields `crawls/site`, not `crawls`.
fn directory_component(path: &str) -> &str {
    let Some(at) = path.rfind(std::path::is_separator) else {
        return "";
    };
    let head = &path[..=at];
    match head.trim_end_matches(std::path::is_separator) {
        "" => head,
        trimmed => trimmed,
    }
}

/// A fully assembled crawler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpiderCommand {
    program: String,
    args: Vec<String>,
}

impl SpiderCommand {
    /// Builds the invocation for a fresh crawl of `request.domain`.
    #[must_use]
    pub fn crawl(program: &str, request: &CrawlRequest) -> Self {
        let mut args = vec![
            "--crawl".to_string(),
            request.domain.clone(),
            "--headless".to_string(),
            "--output-folder".to_string(),
            request.output_folder.clone(),
            "--export-format".to_string(),
            "csv".to_string(),
            "--timestamped-output".to_string(),
            "--save-crawl".to_string(),
        ];
        request.selection.append_to(&mut args);

        Self {
            program: program.to_string(),
            args,
        }
    }

    /// Builds the invocation that reloads `request.crawl_file` and exports
    /// into `output_dir`.
    #[must_use]
    pub fn export(program: &str, request: &ExportRequest, output_dir: &Path) -> Self {
        let mut args = vec![
            "--headless".to_string(),
            "--output-folder".to_string(),
            output_dir.to_string_lossy().into_owned(),
            "--export-format".to_string(),
            "csv".to_string(),
            "--timestamped-output".to_string(),
            "--load-crawl".to_string(),
            request.crawl_file.clone(),
        ];
        request.selection.append_to(&mut args);

        Self {
            program: program.to_string(),
            args,
        }
    }

    /// The executable name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The argument vector, excluding the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for SpiderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

//! Reference data for building requests.
//!
//! The identifier tables are the names the crawler's CLI accepts for
//! `--export-tabs`, `--bulk-export` and `--save-report`. They are offered to
//! callers for discovery only; requests are never checked against them.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::error::SpiderError;

/// Crawler data directory, relative to the user's home directory.
pub const PROJECT_DATA_SUBDIR: &str = ".ScreamingFrogSEOSpider/ProjectInstanceData";

/// Tab and filter names accepted by `--export-tabs`.
pub const EXPORT_TABS: &[&str] = &[
    "Internal:All",
    "Internal:HTML",
    "Internal:JavaScript",
    "Internal:CSS",
    "Internal:Images",
    "Internal:PDF",
    "External:All",
    "External:HTML",
    "Security:All",
    "Security:HTTP URLs",
    "Security:Mixed Content",
    "Security:Missing HSTS Header",
    "Response Codes:All",
    "Response Codes:Blocked by Robots.txt",
    "Response Codes:No Response",
    "Response Codes:Success (2xx)",
    "Response Codes:Redirection (3xx)",
    "Response Codes:Client Error (4xx)",
    "Response Codes:Server Error (5xx)",
    "URL:All",
    "URL:Non ASCII Characters",
    "URL:Underscores",
    "URL:Uppercase",
    "URL:Parameters",
    "URL:Over 115 Characters",
    "Page Titles:All",
    "Page Titles:Missing",
    "Page Titles:Duplicate",
    "Page Titles:Over 60 Characters",
    "Page Titles:Below 30 Characters",
    "Page Titles:Multiple",
    "Meta Description:All",
    "Meta Description:Missing",
    "Meta Description:Duplicate",
    "Meta Description:Over 155 Characters",
    "Meta Description:Below 70 Characters",
    "Meta Description:Multiple",
    "H1:All",
    "H1:Missing",
    "H1:Duplicate",
    "H1:Multiple",
    "H2:All",
    "H2:Missing",
    "H2:Duplicate",
    "H2:Multiple",
    "Content:All",
    "Content:Exact Duplicates",
    "Content:Near Duplicates",
    "Content:Low Content Pages",
    "Images:All",
    "Images:Over 100 KB",
    "Images:Missing Alt Text",
    "Images:Missing Alt Attribute",
    "Canonicals:All",
    "Canonicals:Missing",
    "Canonicals:Canonicalised",
    "Canonicals:Non-Indexable Canonical",
    "Pagination:All",
    "Directives:All",
    "Directives:Noindex",
    "Directives:Nofollow",
    "Hreflang:All",
    "JavaScript:All",
    "Links:All",
    "Structured Data:All",
    "Sitemaps:All",
    "PageSpeed:All",
    "Custom Search:All",
    "Custom Extraction:All",
];

/// Names accepted by `--bulk-export`.
pub const BULK_EXPORTS: &[&str] = &[
    "Links:All Inlinks",
    "Links:All Outlinks",
    "Links:All Anchor Text",
    "Links:External Links",
    "Response Codes:Internal:Redirection (3xx) Inlinks",
    "Response Codes:Internal:Client Error (4xx) Inlinks",
    "Response Codes:Internal:Server Error (5xx) Inlinks",
    "Response Codes:External:Client Error (4xx) Inlinks",
    "Security:Insecure Mixed Content",
    "Images:All Image Inlinks",
    "Images:Images Missing Alt Text Inlinks",
    "Canonicals:Canonicalised Inlinks",
    "Directives:Noindex Inlinks",
    "Content:Near Duplicates",
    "Sitemaps:URLs in Sitemap",
    "Sitemaps:URLs not in Sitemap",
    "Structured Data:Validation Errors & Warnings",
    "Queued URLs",
];

/// Names accepted by `--save-report`.
pub const SAVE_REPORTS: &[&str] = &[
    "Crawl Overview",
    "Issues Overview",
    "Redirects:All Redirects",
    "Redirects:Redirect Chains",
    "Redirects:Redirect & Canonical Chains",
    "Canonicals:Canonical Chains",
    "Canonicals:Non-Indexable Canonicals",
    "Pagination:Non-200 Pagination URLs",
    "Pagination:Unlinked Pagination URLs",
    "Hreflang:All hreflang URLs",
    "Hreflang:Non-200 hreflang URLs",
    "Insecure Content",
    "SERP Summary",
    "Orphan Pages",
    "Structured Data:Validation Errors & Warnings Summary",
    "HTTP Header:HTTP Headers Summary",
    "Cookies:Cookie Summary",
];

/// The three identifier tables keyed by category.
#[must_use]
pub fn export_header_reference() -> Value {
    json!({
        "export-tabs": EXPORT_TABS,
        "bulk-exports": BULK_EXPORTS,
        "save-reports": SAVE_REPORTS,
    })
}

/// Default location of the crawler's stored crawls for the current user.
#[must_use]
pub fn default_project_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(PROJECT_DATA_SUBDIR))
}

/// Lists the stored crawl ids: the names of the subdirectories of `dir`,
/// sorted.
///
/// # Errors
///
/// Returns [`SpiderError::ProjectDataNotFound`] if `dir` does not exist and
/// [`SpiderError::ProjectDataRead`] if it cannot be listed.
pub async fn list_database_ids(dir: &Path) -> Result<Vec<String>, SpiderError> {
    let read_err = |source| SpiderError::ProjectDataRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SpiderError::ProjectDataNotFound {
                path: dir.to_path_buf(),
            });
        }
        Err(e) => return Err(read_err(e)),
    };

    let mut ids = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let file_type = entry.file_type().await.map_err(read_err)?;
        if file_type.is_dir() {
            ids.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    ids.sort();

    Ok(ids)
}

//! End-to-end crawler runs against a stand-in executable.
//!
//! Each test writes a small shell script that records its arguments and
//! exits the way the real crawler would, then drives it through [`Spider`].

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;
use tempfile::{tempdir, TempDir};
use xenopus_mcp::spider::{CrawlRequest, ExportRequest, Spider, Status};

/// Writes an executable script into its own temp dir.
fn fake_crawler(body: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("screamingfrogseospider");
    let script = format!("#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$0.args\"\n{body}\n");
    std::fs::write(&path, script).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to chmod script");
    (dir, path)
}

fn recorded_args(script: &Path) -> Vec<String> {
    let recorded = std::fs::read_to_string(format!("{}.args", script.display()))
        .expect("Script did not record its arguments");
    recorded.lines().map(ToString::to_string).collect()
}

fn spider_for(script: &Path) -> Spider {
    Spider::new(script.to_string_lossy()).with_timeout(Some(Duration::from_secs(30)))
}

#[tokio::test]
async fn crawl_success_passes_argv() {
    let (_dir, script) = fake_crawler("echo 'Crawl finished'\nexit 0");

    let mut request = CrawlRequest::new("https://example.com/");
    request.selection.export_tabs = vec!["Response Codes:Client Error (4xx)".to_string()];
    request.selection.reports = vec!["Crawl Overview".to_string()];

    let response = spider_for(&script).domain_crawl(&request).await;

    assert_eq!(response.status, Status::Success);
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        json!({
            "status": "success",
            "domain": "https://example.com/",
            "message": "Crawl completed.",
        })
    );

    let args = recorded_args(&script);
    assert_eq!(
        args,
        [
            "--crawl",
            "https://example.com/",
            "--headless",
            "--output-folder",
            "exports",
            "--export-format",
            "csv",
            "--timestamped-output",
            "--save-crawl",
            "--export-tabs",
            "Response Codes:Client Error (4xx)",
            "--save-report",
            "Crawl Overview",
        ]
    );
}

#[tokio::test]
async fn crawl_failure_reports_code_and_stderr() {
    let (_dir, script) =
        fake_crawler("echo 'partial output'\necho 'Unknown export tab: Foo:Bar' >&2\nexit 3");

    let response = spider_for(&script)
        .domain_crawl(&CrawlRequest::new("example.com"))
        .await;

    assert!(response.is_error());
    assert_eq!(
        response.message,
        "Error running Screaming Frog for domain example.com. Return code: 3"
    );
    assert_eq!(
        response.details.as_deref(),
        Some("Unknown export tab: Foo:Bar\n")
    );
}

#[tokio::test]
async fn export_creates_output_folder_next_to_crawl() {
    let (_dir, script) = fake_crawler("exit 0");
    let crawls = tempdir().unwrap();
    let crawl_file = crawls.path().join("site.seospider");
    std::fs::write(&crawl_file, b"").unwrap();

    let mut request = ExportRequest::new(crawl_file.to_string_lossy());
    request.output_folder = "nested/out".to_string();
    request.selection.bulk_exports = vec!["Links:All Inlinks".to_string()];

    let spider = spider_for(&script);
    let response = spider.post_crawl_export(&request).await;

    let expected_dir = crawls.path().join("nested/out");
    assert!(expected_dir.is_dir());
    assert_eq!(response.status, Status::Success);
    assert_eq!(response.message, "Data export completed.");

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["crawl_file"], &*crawl_file.to_string_lossy());

    let args = recorded_args(&script);
    let out_at = args.iter().position(|a| a == "--output-folder").unwrap();
    assert_eq!(Path::new(&args[out_at + 1]), expected_dir);
    let load_at = args.iter().position(|a| a == "--load-crawl").unwrap();
    assert_eq!(args[load_at + 1], crawl_file.to_string_lossy());
    assert_eq!(args[load_at + 2..], ["--bulk-export", "Links:All Inlinks"]);

    // Existing folder is fine on a second run.
    let again = spider.post_crawl_export(&request).await;
    assert_eq!(again.status, Status::Success);
}

#[tokio::test]
async fn export_to_absolute_folder() {
    let (_dir, script) = fake_crawler("exit 0");
    let target = tempdir().unwrap();
    let absolute = target.path().join("abs-out");

    let mut request = ExportRequest::new("/nonexistent/crawls/site.seospider");
    request.output_folder = absolute.to_string_lossy().into_owned();

    let response = spider_for(&script).post_crawl_export(&request).await;

    assert_eq!(response.status, Status::Success);
    assert!(absolute.is_dir());
}

#[tokio::test]
async fn export_folder_creation_failure_is_error_response() {
    let (_dir, script) = fake_crawler("exit 0");
    let crawls = tempdir().unwrap();
    // A file where the output directory should go.
    std::fs::write(crawls.path().join("blocked"), b"").unwrap();
    let crawl_file = crawls.path().join("site.seospider");

    let mut request = ExportRequest::new(crawl_file.to_string_lossy());
    request.output_folder = "blocked/out".to_string();

    let response = spider_for(&script).post_crawl_export(&request).await;

    assert!(response.is_error());
    assert!(response.message.contains("failed to create output folder"));
    assert!(response.details.is_some());
}

#[tokio::test]
async fn slow_crawler_times_out() {
    let (_dir, script) = fake_crawler("exec sleep 30");

    let spider =
        Spider::new(script.to_string_lossy()).with_timeout(Some(Duration::from_millis(200)));
    let response = spider.domain_crawl(&CrawlRequest::new("example.com")).await;

    assert!(response.is_error());
    assert!(response.message.contains("Timed out"));
}

#[tokio::test]
async fn dropping_crawl_kills_crawler() {
    let (dir, script) = fake_crawler("echo $$ > \"$0.pid\"\nexec sleep 60");
    let pid_file = dir.path().join("screamingfrogseospider.pid");
    let spider = spider_for(&script);

    let started = async {
        loop {
            if let Ok(pid) = tokio::fs::read_to_string(&pid_file).await {
                if !pid.trim().is_empty() {
                    return pid.trim().to_string();
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    };

    let request = CrawlRequest::new("example.com");
    let pid = tokio::select! {
        _ = spider.domain_crawl(&request) => {
            panic!("crawl finished before it was cancelled");
        }
        pid = started => pid,
    };

    let gone = |pid: &str| {
        let out = std::process::Command::new("ps")
            .args(["-o", "stat=", "-p", pid])
            .output()
            .expect("Failed to run ps");
        let stat = String::from_utf8_lossy(&out.stdout).trim().to_string();
        stat.is_empty() || stat.starts_with('Z')
    };
    for _ in 0..200 {
        if gone(&pid) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("crawler {pid} still running after the call was dropped");
}

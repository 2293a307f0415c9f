//! xenopus-mcp: MCP server for Screaming Frog SEO Spider
//!
//! This library lets an AI assistant run headless crawls and post-crawl
//! exports through the Screaming Frog command-line interface.
//!
//! # Architecture
//!
//! The server is a thin layer over the crawler's CLI:
//!
//! - **Tools**: `domain_crawl` starts a fresh crawl, `post_crawl_export`
//!   reloads a stored crawl and exports from it
//! - **Resources**: the export/report names the CLI accepts, and the ids of
//!   stored crawls
//!
//! The crawler itself does all crawling, storage and export writing.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation
//! - [`spider`] — Command construction, process invocation and result mapping

pub mod config;
pub mod error;
pub mod mcp;
pub mod spider;

//! Model Context Protocol (MCP) server implementation.
//!
//! The crawler tools are exposed over the stdio transport using
//! newline-delimited JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                          MCP Server                           │
//! │                                                               │
//! │   ┌─────────────┐    ┌─────────────┐    ┌─────────────────┐   │
//! │   │  Transport  │───▶│   Server    │───▶│  Spider         │   │
//! │   │   (stdio)   │    │ (lifecycle) │    │ (tools, data)   │   │
//! │   └─────────────┘    └─────────────┘    └────────┬────────┘   │
//! │                                                  │            │
//! └──────────────────────────────────────────────────┼────────────┘
//!                                                    ▼
//!                                       screamingfrogseospider
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::StdioTransport;

//! MCP server exposing the crawler tools and reference resources.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls and resource reads
//! 3. **Shutdown**: EOF on stdin or SIGINT/SIGTERM
//!
//! Messages are handled one at a time. A tool call holds the loop until the
//! crawler exits, times out, or a shutdown signal arrives. Shutdown drops the
//! in-flight call, which kills the crawler process.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::SpiderError;
use crate::mcp::protocol::{
    ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::StdioTransport;
use crate::spider::{reference, CrawlRequest, ExportRequest, Spider, SpiderResponse};

/// URI of the export identifier reference resource.
pub const EXPORT_HEADER_REFERENCE_URI: &str = "data://export-header-reference";

/// URI of the stored crawl listing resource.
pub const DATABASE_ID_LIST_URI: &str = "data://database-id-list";

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ListCapabilities,
    /// Resource-related capabilities.
    pub resources: ListCapabilities,
}

/// Capabilities shared by the tool and resource lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCapabilities {
    /// Whether the list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if requires a predicate fn(&T) -> bool, so we must take &bool here
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// A resource definition for resources/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDefinition {
    /// Resource URI.
    pub uri: String,
    /// Short name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// MIME type of the contents.
    pub mime_type: String,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Parameters for resources/read request.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceReadParams {
    /// URI of the resource to read.
    pub uri: String,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    /// Wraps a crawler response as pretty-printed JSON text.
    #[must_use]
    pub fn from_response(response: &SpiderResponse) -> Self {
        let text = serde_json::to_string_pretty(response)
            .unwrap_or_else(|_| response.message.clone());

        if response.is_error() {
            Self::error(text)
        } else {
            Self::text(text)
        }
    }
}

/// The MCP server for crawler control.
pub struct McpServer {
    /// Current server state.
    state: ServerState,
    /// The transport layer.
    transport: StdioTransport,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// The crawler installation tools run against.
    spider: Spider,
}

impl McpServer {
    /// Creates a new MCP server driving `spider`.
    #[must_use]
    pub fn new(spider: Spider) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport: StdioTransport::new(),
            protocol_version: None,
            spider,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Runs the MCP server main loop with graceful shutdown handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    // Signals stay live while a request is being handled.
                    tokio::select! {
                        _ = sigint.recv() => {
                            tracing::info!("Received SIGINT during request, cancelling");
                            self.state = ServerState::ShuttingDown;
                            return Ok(());
                        }

                        _ = sigterm.recv() => {
                            tracing::info!("Received SIGTERM during request, cancelling");
                            self.state = ServerState::ShuttingDown;
                            return Ok(());
                        }

                        done = self.handle_transport_result(line_result) => {
                            if done? {
                                return Ok(());
                            }
                        }
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    tokio::select! {
                        _ = &mut ctrl_c => {
                            tracing::info!("Received Ctrl+C during request, cancelling");
                            self.state = ServerState::ShuttingDown;
                            return Ok(());
                        }

                        done = self.handle_transport_result(line_result) => {
                            if done? {
                                return Ok(());
                            }
                        }
                    }
                }
            }
        }
    }

    /// Handles the result from transport read.
    ///
    /// Returns `true` if the server should shut down.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            tracing::debug!("stdin closed");
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        self.handle_line(&line).await?;

        Ok(self.state == ServerState::ShuttingDown)
    }

    /// Handles a single line of input.
    async fn handle_line(&mut self, line: &str) -> std::io::Result<()> {
        use crate::mcp::protocol::parse_message;

        match parse_message(line) {
            Ok(IncomingMessage::Request(req)) => {
                let response = self.dispatch(&req).await;
                match response {
                    Ok(resp) => self.transport.write_response(&resp).await,
                    Err(error) => self.transport.write_error(&error).await,
                }
            }
            Ok(IncomingMessage::Notification(notif)) => {
                self.handle_notification(&notif);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(code = error.error.code, "Rejected malformed message");
                self.transport.write_error(&error).await
            }
        }
    }

    /// Routes a request to its handler.
    pub async fn dispatch(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        tracing::debug!(id = %req.id, method = %req.method, "Handling request");

        match req.method.as_str() {
            "initialize" => self.handle_initialize(req),
            "ping" => Ok(JsonRpcResponse::success(req.id.clone(), json!({}))),
            "tools/list" => self.handle_tools_list(req),
            "tools/call" => self.handle_tools_call(req).await,
            "resources/list" => self.handle_resources_list(req),
            "resources/read" => self.handle_resources_read(req).await,
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        }
    }

    /// Handles an incoming notification.
    pub fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            tracing::info!("Client initialised");
            self.state = ServerState::Running;
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request_with(
                req.id.clone(),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = req.parse_params("initialize")?;
        if let Some(client) = &params.client_info {
            tracing::info!(
                client = %client.name,
                version = client.version.as_deref().unwrap_or("unknown"),
                requested_protocol = %params.protocol_version,
                "Client connected"
            );
        }

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();

        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": Self::get_tool_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = req.parse_params("tool call")?;

        let result = match params.name.as_str() {
            "domain_crawl" => self.call_domain_crawl(&params.arguments).await,
            "post_crawl_export" => self.call_post_crawl_export(&params.arguments).await,
            _ => ToolCallResult::error(format!("Unknown tool: {}", params.name)),
        };

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Handles the resources/list request.
    fn handle_resources_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "resources": Self::get_resource_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the resources/read request.
    async fn handle_resources_read(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ResourceReadParams = req.parse_params("resource read")?;

        let contents = match params.uri.as_str() {
            EXPORT_HEADER_REFERENCE_URI => reference::export_header_reference(),
            DATABASE_ID_LIST_URI => self
                .spider
                .database_id_list()
                .await
                .map_err(|e| Self::resource_error(&req.id, &e))?,
            other => {
                return Err(JsonRpcError::resource_not_found(
                    req.id.clone(),
                    format!("Unknown resource: {other}"),
                ))
            }
        };

        let text = serde_json::to_string_pretty(&contents).map_err(|e| {
            JsonRpcError::internal_error(req.id.clone(), format!("Failed to encode resource: {e}"))
        })?;

        let result = json!({
            "contents": [{
                "uri": params.uri,
                "mimeType": "application/json",
                "text": text,
            }],
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    fn resource_error(id: &RequestId, error: &SpiderError) -> JsonRpcError {
        tracing::error!(error = %error, "Failed to read resource");
        match error {
            SpiderError::ProjectDataNotFound { .. } => {
                JsonRpcError::resource_not_found(id.clone(), error.to_string())
            }
            _ => JsonRpcError::internal_error(id.clone(), error.to_string()),
        }
    }

    /// Ensures the server is in the Running state.
    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }

    /// Returns the list of available tools.
    #[must_use]
    pub fn get_tool_definitions() -> Vec<ToolDefinition> {
        let identifier_list = |what: &str| {
            json!({
                "type": "array",
                "items": { "type": "string" },
                "description": format!(
                    "{what} to export. See the {EXPORT_HEADER_REFERENCE_URI} resource for valid names. Omit or leave empty for none."
                )
            })
        };

        vec![
            ToolDefinition {
                name: "domain_crawl".to_string(),
                description: Some(
                    "Run a Screaming Frog SEO Spider crawl of a domain in headless mode, save the \
                     crawl, and write the selected exports as timestamped CSV files. Blocks until \
                     the crawl finishes. Returns a status dictionary."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "domain": {
                            "type": "string",
                            "description": "Domain or start URL to crawl"
                        },
                        "export_tabs": identifier_list("Tab exports (e.g. \"Internal:All\")"),
                        "bulk_exports": identifier_list("Bulk exports (e.g. \"Links:All Inlinks\")"),
                        "reports": identifier_list("Reports (e.g. \"Crawl Overview\")"),
                        "output_folder": {
                            "type": "string",
                            "description": "Folder for exports (default: exports)"
                        },
                        "business_name": {
                            "type": "string",
                            "description": "Label for the client the crawl is for (default: default_business_name)"
                        },
                        "config": {
                            "type": "string",
                            "description": "Crawl configuration file name (default: default.seospider)"
                        }
                    },
                    "required": ["domain"]
                }),
            },
            ToolDefinition {
                name: "post_crawl_export".to_string(),
                description: Some(
                    "Load a saved Screaming Frog crawl and write the selected exports as \
                     timestamped CSV files without crawling again. A relative output_folder is \
                     created next to the crawl file. Returns a status dictionary."
                        .to_string(),
                ),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "crawl_file": {
                            "type": "string",
                            "description": "Path to the saved crawl (.seospider file or database crawl)"
                        },
                        "export_tabs": identifier_list("Tab exports"),
                        "bulk_exports": identifier_list("Bulk exports"),
                        "reports": identifier_list("Reports"),
                        "output_folder": {
                            "type": "string",
                            "description": "Folder for exports, relative to the crawl file's directory unless absolute (default: postcrawl-exports)"
                        }
                    },
                    "required": ["crawl_file"]
                }),
            },
        ]
    }

    /// Returns the list of readable resources.
    #[must_use]
    pub fn get_resource_definitions() -> Vec<ResourceDefinition> {
        vec![
            ResourceDefinition {
                uri: EXPORT_HEADER_REFERENCE_URI.to_string(),
                name: "export-header-reference".to_string(),
                description: "Export tab, bulk export and report names accepted by Screaming Frog"
                    .to_string(),
                mime_type: "application/json".to_string(),
            },
            ResourceDefinition {
                uri: DATABASE_ID_LIST_URI.to_string(),
                name: "database-id-list".to_string(),
                description: "IDs of stored crawls that post_crawl_export can load".to_string(),
                mime_type: "application/json".to_string(),
            },
        ]
    }

    // ==================== Tool Handlers ====================

    /// Runs a fresh crawl.
    async fn call_domain_crawl(&self, arguments: &Value) -> ToolCallResult {
        let request: CrawlRequest = match Self::parse_arguments(arguments, "domain") {
            Ok(request) => request,
            Err(result) => return result,
        };

        let response = self.spider.domain_crawl(&request).await;
        ToolCallResult::from_response(&response)
    }

    /// Exports from a stored crawl.
    async fn call_post_crawl_export(&self, arguments: &Value) -> ToolCallResult {
        let request: ExportRequest = match Self::parse_arguments(arguments, "crawl_file") {
            Ok(request) => request,
            Err(result) => return result,
        };

        let response = self.spider.post_crawl_export(&request).await;
        ToolCallResult::from_response(&response)
    }

    /// Deserialises tool arguments after checking the required string field.
    fn parse_arguments<T: serde::de::DeserializeOwned>(
        arguments: &Value,
        required: &str,
    ) -> Result<T, ToolCallResult> {
        match arguments.get(required).and_then(Value::as_str) {
            Some(value) if !value.trim().is_empty() => {}
            _ => {
                return Err(ToolCallResult::error(format!(
                    "Missing required parameter: {required}"
                )))
            }
        }

        serde_json::from_value(arguments.clone())
            .map_err(|e| ToolCallResult::error(format!("Invalid arguments: {e}")))
    }
}

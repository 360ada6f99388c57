//! MCP server implementation.
//!
//! Handles JSON-RPC 2.0 over stdio according to the MCP protocol specification.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::Instrument;

use crate::convert::{tool_error_result, tool_result};
use crate::error::{rpc_codes, McpError, Result};
use crate::session::McpSession;
use crate::tools::ToolRegistry;

/// MCP protocol version we support.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Server information.
pub const SERVER_NAME: &str = "squashtm-mcp";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Deepest `children` nesting a `create_*_folders` call can carry.
///
/// Messages are parsed with serde_json's default recursion limit of 128
/// levels; every folder level takes two (the folder object and its
/// `children` array) on top of the request envelope. Deeper messages are
/// rejected with a parse error.
pub const MAX_MESSAGE_FOLDER_DEPTH: usize = 60;

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Request id; absent for notifications. An explicit `null` id is
    /// `Some(JsonValue::Null)` and still gets a response.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<JsonValue>,
    /// Method name
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: Option<JsonValue>,
}

/// Called only when the `id` member is present, so `null` stays distinct
/// from a missing id.
fn present_id<'de, D>(deserializer: D) -> std::result::Result<Option<JsonValue>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(Some)
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// Protocol version, always "2.0"
    pub jsonrpc: String,
    /// Id of the answered request
    pub id: JsonValue,
    /// Result on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonValue>,
    /// Error on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: JsonValue, result: JsonValue) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: JsonValue, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
        }
    }

    /// Create an error response from an McpError.
    pub fn from_error(id: JsonValue, err: McpError) -> Self {
        Self::error(id, err.rpc_code(), err.to_string())
    }
}

/// MCP server.
pub struct McpServer {
    session: McpSession,
    registry: ToolRegistry,
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server with the given session.
    pub fn new(session: McpSession) -> Self {
        Self {
            session,
            registry: ToolRegistry::new(),
            initialized: false,
        }
    }

    /// Whether the client has sent `initialize`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server, reading from stdin and writing to stdout.
    pub async fn run(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.run_with(stdin, stdout).await
    }

    /// Serve line-delimited JSON-RPC messages until `reader` reaches EOF.
    pub async fn run_with<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                // EOF - client disconnected
                tracing::info!("stdin closed, shutting down");
                break;
            }

            let message = line.trim();
            if message.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(message) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => Some(JsonRpcResponse::error(
                    JsonValue::Null,
                    rpc_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                )),
            };

            if let Some(response) = response {
                let response_json = serde_json::to_string(&response)?;
                writer.write_all(response_json.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }

        Ok(())
    }

    /// Handle a single JSON-RPC message.
    ///
    /// Notifications (messages without an id) never get a response.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let id = match request.id.clone() {
            Some(id) => id,
            None => {
                self.handle_notification(&request);
                return None;
            }
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                rpc_codes::INVALID_REQUEST,
                "Invalid JSON-RPC version".to_string(),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            _ => JsonRpcResponse::error(
                id,
                rpc_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            ),
        };
        Some(response)
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" | "initialized" => {
                tracing::debug!("client initialized");
            }
            other => tracing::debug!(method = other, "ignoring notification"),
        }
    }

    /// Handle the initialize request.
    fn handle_initialize(&mut self, id: JsonValue) -> JsonRpcResponse {
        self.initialized = true;

        JsonRpcResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION
                }
            }),
        )
    }

    /// Handle the tools/list request.
    fn handle_tools_list(&self, id: JsonValue) -> JsonRpcResponse {
        match serde_json::to_value(self.registry.tools()) {
            Ok(tools) => JsonRpcResponse::success(id, serde_json::json!({ "tools": tools })),
            Err(e) => JsonRpcResponse::from_error(id, McpError::Internal(e.to_string())),
        }
    }

    /// Handle the tools/call request.
    async fn handle_tools_call(&self, id: JsonValue, params: Option<JsonValue>) -> JsonRpcResponse {
        let params = match params {
            Some(JsonValue::Object(obj)) => obj,
            _ => {
                return JsonRpcResponse::error(
                    id,
                    rpc_codes::INVALID_PARAMS,
                    "Missing params object".to_string(),
                )
            }
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n.to_string(),
            None => {
                return JsonRpcResponse::error(
                    id,
                    rpc_codes::INVALID_PARAMS,
                    "Missing 'name' in params".to_string(),
                )
            }
        };

        let arguments = match params.get("arguments") {
            Some(JsonValue::Object(obj)) => obj.clone(),
            Some(JsonValue::Null) | None => Map::new(),
            _ => {
                return JsonRpcResponse::error(
                    id,
                    rpc_codes::INVALID_PARAMS,
                    "'arguments' must be an object".to_string(),
                )
            }
        };

        let correlation_id = self.session.next_correlation_id();
        let span = tracing::info_span!("tool_call", tool = %name, correlation_id = %correlation_id);

        async move {
            tracing::info!(arguments = %JsonValue::Object(arguments.clone()), "tool called");

            let outcome = self
                .registry
                .dispatch(&self.session, &name, arguments)
                .await
                .and_then(tool_result);

            match outcome {
                Ok(result) => {
                    tracing::info!(result = %result["structuredContent"], "tool returned");
                    JsonRpcResponse::success(id, result)
                }
                Err(err) if err.is_tool_error() => {
                    tracing::warn!(error = %err, "tool failed");
                    JsonRpcResponse::success(id, tool_error_result(&err))
                }
                Err(err) => {
                    tracing::warn!(error = %err, "tool call rejected");
                    JsonRpcResponse::from_error(id, err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

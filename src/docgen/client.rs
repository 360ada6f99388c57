//! Line-delimited JSON-RPC client driving an MCP server child process.
//!
//! - Requests carry ids from a monotonically increasing counter.
//! - In-flight requests are tracked in a `pending` map keyed by request id;
//!   a background task routes each response line to its waiting caller.
//! - Every request has a fixed timeout. On timeout the pending entry is
//!   removed and the call fails; nothing is retried.
//! - The child process is killed when the client is dropped.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value as JsonValue;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{oneshot, Mutex};

use crate::error::{McpError, Result};
use crate::server::PROTOCOL_VERSION;
use crate::tools::ToolDef;

/// Timeout applied to every request unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

type PendingMap = HashMap<u64, oneshot::Sender<JsonValue>>;

/// MCP client over the stdio of a spawned server.
pub struct McpStdioClient {
    child: Child,
    stdin: ChildStdin,
    next_id: AtomicU64,
    pending: Arc<Mutex<PendingMap>>,
    timeout: Duration,
}

impl McpStdioClient {
    /// Spawn `program` with `args` and start routing its responses.
    pub fn spawn(program: &str, args: &[String], timeout: Duration) -> Result<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| McpError::Io(format!("failed to spawn MCP server `{}`: {}", program, e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Internal("child stdin unavailable after spawn".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Internal("child stdout unavailable after spawn".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| McpError::Internal("child stderr unavailable after spawn".into()))?;

        let pending: Arc<Mutex<PendingMap>> = Arc::new(Mutex::new(HashMap::new()));

        // Route stdout lines to their pending request.
        let routes = Arc::clone(&pending);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                let message: JsonValue = match serde_json::from_str(&line) {
                    Ok(message) => message,
                    Err(_) => {
                        tracing::warn!(%line, "failed to parse server message");
                        continue;
                    }
                };
                let sender = match message.get("id").and_then(JsonValue::as_u64) {
                    Some(id) => routes.lock().await.remove(&id),
                    None => None,
                };
                match sender {
                    Some(sender) => {
                        let _ = sender.send(message);
                    }
                    None => tracing::debug!(%line, "unsolicited server message"),
                }
            }
            // Dropping the senders fails every request still waiting.
            routes.lock().await.clear();
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!("server stderr: {}", line);
            }
        });

        Ok(Self {
            child,
            stdin,
            next_id: AtomicU64::new(0),
            pending,
            timeout,
        })
    }

    /// Send a request and wait for its result.
    pub async fn request(&mut self, method: &str, params: JsonValue) -> Result<JsonValue> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        // Register before sending so a fast response is never missed.
        self.pending.lock().await.insert(id, tx);

        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let line = format!("{}\n", request);
        if let Err(e) = self.write_line(&line).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }
        tracing::debug!(id, method, "request sent");

        let response = match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(response)) => response,
            Ok(Err(_)) => {
                return Err(McpError::Protocol(format!(
                    "server closed the connection before answering '{}'",
                    method
                )))
            }
            Err(_) => {
                self.pending.lock().await.remove(&id);
                return Err(McpError::Timeout(format!(
                    "'{}' (id {}) got no response within {:?}",
                    method, id, self.timeout
                )));
            }
        };

        if let Some(error) = response.get("error") {
            return Err(McpError::Rpc {
                code: error.get("code").and_then(JsonValue::as_i64).unwrap_or_default(),
                message: error
                    .get("message")
                    .and_then(JsonValue::as_str)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        Ok(response.get("result").cloned().unwrap_or(JsonValue::Null))
    }

    /// Send a notification; no response is expected.
    pub async fn notify(&mut self, method: &str) -> Result<()> {
        let line = format!("{}\n", serde_json::json!({ "jsonrpc": "2.0", "method": method }));
        self.write_line(&line).await
    }

    /// Perform the MCP handshake.
    pub async fn initialize(&mut self) -> Result<JsonValue> {
        let result = self
            .request(
                "initialize",
                serde_json::json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "squashtm-mcp-docgen",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
            .await?;
        self.notify("notifications/initialized").await?;
        Ok(result)
    }

    /// Fetch the server's tool catalog.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDef>> {
        let result = self.request("tools/list", serde_json::json!({})).await?;
        match result.get("tools") {
            Some(tools) => serde_json::from_value(tools.clone())
                .map_err(|e| McpError::Protocol(format!("invalid tools/list result: {}", e))),
            None => Ok(Vec::new()),
        }
    }

    /// Number of requests still waiting for a response.
    pub async fn pending_requests(&self) -> usize {
        self.pending.lock().await.len()
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }
}

impl Drop for McpStdioClient {
    fn drop(&mut self) {
        let _ = self.child.start_kill();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str, timeout: Duration) -> McpStdioClient {
        McpStdioClient::spawn("sh", &["-c".to_string(), script.to_string()], timeout).unwrap()
    }

    #[tokio::test]
    async fn test_silent_server_times_out_and_clears_pending() {
        let mut client = sh("sleep 5", Duration::from_millis(100));
        let err = client.request("tools/list", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::Timeout(_)));
        assert_eq!(client.pending_requests().await, 0);
    }

    #[tokio::test]
    async fn test_response_is_routed_by_id() {
        let mut client = sh(
            r#"read line; echo '{"jsonrpc":"2.0","id":0,"result":{"tools":[{"name":"ping_tool","description":"d","inputSchema":{"type":"object"}}]}}'; sleep 1"#,
            Duration::from_secs(5),
        );
        let tools = client.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "ping_tool");
        assert!(tools[0].output_schema.is_none());
    }

    #[tokio::test]
    async fn test_error_response_becomes_rpc_error() {
        let mut client = sh(
            r#"read line; echo '{"jsonrpc":"2.0","id":0,"error":{"code":-32601,"message":"Unknown method"}}'; sleep 1"#,
            Duration::from_secs(5),
        );
        let err = client.request("bogus", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::Rpc { code: -32601, .. }));
    }

    #[tokio::test]
    async fn test_exited_server_fails_fast() {
        let mut client = sh("read line; exit 0", Duration::from_secs(5));
        let err = client.request("ping", serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::Protocol(_)));
    }
}

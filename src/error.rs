//! Error types for the MCP server.
//!
//! Maps SquashTM REST failures and protocol problems to MCP-friendly error responses.

use serde::{Deserialize, Serialize};

/// MCP server errors.
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum McpError {
    /// The SquashTM API answered with a non-success HTTP status.
    #[error("Request failed:\nstatus={status}\nerror={message}")]
    RemoteRequestFailed {
        /// HTTP status code
        status: u16,
        /// The `message` field of a JSON error body, or the raw body text
        message: String,
    },

    /// The SquashTM API answered with a body we could not understand.
    #[error("{0}")]
    RemoteResponseMalformed(String),

    /// The SquashTM API could not be reached.
    #[error("Error making SquashTM REST API request: {0}")]
    RemoteUnavailable(String),

    /// Unknown tool requested.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Missing required argument.
    #[error("missing required argument: {0}")]
    MissingArg(String),

    /// Invalid argument value.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArg {
        /// Argument name
        name: String,
        /// Reason why it's invalid
        reason: String,
    },

    /// JSON-RPC protocol error.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A JSON-RPC request got no response in time.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The peer answered a JSON-RPC request with an error object.
    #[error("rpc error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message sent by the peer
        message: String,
    },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for McpError {
    fn from(err: std::io::Error) -> Self {
        McpError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for McpError {
    fn from(err: serde_json::Error) -> Self {
        McpError::Protocol(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for McpError {
    fn from(err: reqwest::Error) -> Self {
        McpError::RemoteUnavailable(err.to_string())
    }
}

/// JSON-RPC error codes.
pub mod rpc_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;
}

impl McpError {
    /// Convert to JSON-RPC error code.
    pub fn rpc_code(&self) -> i32 {
        match self {
            McpError::UnknownTool(_) => rpc_codes::METHOD_NOT_FOUND,
            McpError::MissingArg(_) | McpError::InvalidArg { .. } => rpc_codes::INVALID_PARAMS,
            McpError::Protocol(_) => rpc_codes::INVALID_REQUEST,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }

    /// Whether this error happened while talking to SquashTM.
    ///
    /// Such failures are reported as a tool result with `isError: true`
    /// rather than as a JSON-RPC error, so the calling model can read them.
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            McpError::RemoteRequestFailed { .. }
                | McpError::RemoteResponseMalformed(_)
                | McpError::RemoteUnavailable(_)
        )
    }
}

/// Result type for MCP operations.
pub type Result<T> = std::result::Result<T, McpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_failure_message_keeps_status_and_text() {
        let err = McpError::RemoteRequestFailed {
            status: 404,
            message: "no such project".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed:\nstatus=404\nerror=no such project");
        assert!(err.is_tool_error());
        assert_eq!(err.rpc_code(), rpc_codes::INTERNAL_ERROR);
    }

    #[test]
    fn test_argument_errors_map_to_invalid_params() {
        assert_eq!(McpError::MissingArg("x".into()).rpc_code(), rpc_codes::INVALID_PARAMS);
        let err = McpError::InvalidArg {
            name: "x".into(),
            reason: "bad".into(),
        };
        assert_eq!(err.rpc_code(), rpc_codes::INVALID_PARAMS);
        assert!(!err.is_tool_error());
        assert_eq!(McpError::UnknownTool("t".into()).rpc_code(), rpc_codes::METHOD_NOT_FOUND);
    }
}

//! # squashtm-mcp
//!
//! MCP (Model Context Protocol) server for the SquashTM test management tool.
//!
//! This crate exposes the SquashTM REST API as tools for AI agents. It implements
//! the MCP protocol over stdin/stdout using JSON-RPC 2.0.
//!
//! ## Features
//!
//! - **18 tools** covering projects, requirement/test case/campaign folders,
//!   requirements and test cases
//! - **Folder trees**: hierarchies rebuilt from per-folder parent references
//! - **Recursive folder creation**: whole nested structures in one call
//! - **Documentation generator**: `squashtm-mcp-docgen` renders the tool catalog
//!   of a running server as Markdown
//!
//! ## Usage
//!
//! The server is typically run as an executable and configured in AI tools like Claude Desktop:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "squashtm": {
//!       "command": "/path/to/squashtm-mcp",
//!       "env": {
//!         "SQUASHTM_URL": "https://squash.example.com/squash",
//!         "SQUASHTM_API_KEY": "<token>"
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! ## Library Usage
//!
//! For testing or embedding, you can use the library API:
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use squashtm_mcp::{McpServer, McpSession, RemoteConfig, SquashClient};
//!
//! # async fn run() -> squashtm_mcp::Result<()> {
//! let config = RemoteConfig::new("https://squash.example.com", "token", Duration::from_secs(30))?;
//! let session = McpSession::new(Arc::new(SquashClient::new(config)?));
//! let mut server = McpServer::new(session);
//!
//! // Reads from stdin, writes to stdout
//! server.run().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod convert;
pub mod docgen;
pub mod error;
pub mod folders;
pub mod logging;
pub mod remote;
pub mod server;
pub mod session;
pub mod tools;

pub use config::RemoteConfig;
pub use error::{McpError, Result};
pub use remote::{RemoteStore, SquashClient};
pub use server::{JsonRpcRequest, JsonRpcResponse, McpServer};
pub use session::McpSession;
pub use tools::{ToolDef, ToolRegistry};

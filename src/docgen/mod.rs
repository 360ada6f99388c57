//! Tool catalog documentation generator.
//!
//! Connects to an MCP server over stdio, lists its tools and renders them as
//! Markdown. Used by the `squashtm-mcp-docgen` binary.

pub mod client;
pub mod markdown;
pub mod params;

pub use client::{McpStdioClient, DEFAULT_REQUEST_TIMEOUT};
pub use markdown::generate_markdown;
pub use params::{collect_parameters, format_type, ParameterRow};

use crate::error::Result;

/// File the documentation is written to by default.
pub const DEFAULT_OUTPUT: &str = "MCP_TOOLS.md";

/// Initialize the server behind `client` and render its tool catalog.
pub async fn document_server(client: &mut McpStdioClient) -> Result<String> {
    client.initialize().await?;
    let tools = client.list_tools().await?;
    tracing::info!(count = tools.len(), "tools listed");
    Ok(generate_markdown(&tools))
}

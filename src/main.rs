//! MCP server for SquashTM.
//!
//! Run with `squashtm-mcp --url https://squash.example.com --api-key <token>`,
//! or set `SQUASHTM_URL` and `SQUASHTM_API_KEY`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use squashtm_mcp::config::DEFAULT_TIMEOUT;
use squashtm_mcp::{logging, McpServer, McpSession, RemoteConfig, SquashClient};

/// MCP server for SquashTM.
///
/// Exposes SquashTM projects, folders, requirements and test cases as MCP
/// tools for AI agents. Communicates via JSON-RPC 2.0 over stdin/stdout.
#[derive(Parser)]
#[command(name = "squashtm-mcp")]
#[command(version, about, long_about = None)]
struct Args {
    /// Base URL of the SquashTM instance (e.g. https://squash.example.com/squash).
    #[arg(long, env = "SQUASHTM_URL", value_name = "URL")]
    url: String,

    /// API token used as bearer credential.
    #[arg(long, env = "SQUASHTM_API_KEY", hide_env_values = true, value_name = "TOKEN")]
    api_key: String,

    /// Timeout of each SquashTM REST request, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Also append log records to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init(args.verbose, args.log_file.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let config = match RemoteConfig::new(&args.url, &args.api_key, Duration::from_secs(args.timeout_secs)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(api_base = config.api_base(), "starting squashtm-mcp");

    let client = match SquashClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: Failed to create SquashTM client: {}", e);
            std::process::exit(1);
        }
    };

    // Create session and server
    let session = McpSession::new(Arc::new(client));
    let mut server = McpServer::new(session);

    // Run the server
    if let Err(e) = server.run().await {
        eprintln!("Error: Server error: {}", e);
        std::process::exit(1);
    }
}

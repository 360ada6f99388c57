//! Generate Markdown documentation of an MCP server's tools.
//!
//! Run with `squashtm-mcp-docgen -- squashtm-mcp --url ... --api-key ...`.
//! Without a command, `squashtm-mcp` is started with the current environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use squashtm_mcp::docgen::{document_server, McpStdioClient, DEFAULT_OUTPUT, DEFAULT_REQUEST_TIMEOUT};
use squashtm_mcp::logging;

const DEFAULT_SERVER: &str = "squashtm-mcp";

/// Generate Markdown documentation of an MCP server's tools.
///
/// Spawns the server, speaks JSON-RPC 2.0 over its stdin/stdout and writes
/// the tool catalog to a Markdown file.
#[derive(Parser)]
#[command(name = "squashtm-mcp-docgen")]
#[command(version, about, long_about = None)]
struct Args {
    /// File to write the documentation to.
    #[arg(long, short, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Timeout of each request to the server, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Enable debug logging to stderr.
    #[arg(long, short)]
    verbose: bool,

    /// Server command and its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    command: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init(args.verbose, None) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let (program, program_args) = match args.command.split_first() {
        Some((program, rest)) => (program.clone(), rest.to_vec()),
        None => (DEFAULT_SERVER.to_string(), Vec::new()),
    };

    println!("Connecting to MCP server...");
    let mut client = match McpStdioClient::spawn(&program, &program_args, Duration::from_secs(args.timeout_secs)) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let markdown = match document_server(&mut client).await {
        Ok(markdown) => markdown,
        Err(e) => {
            eprintln!("Error: {}", e);
            drop(client);
            std::process::exit(1);
        }
    };
    drop(client);

    if let Err(e) = std::fs::write(&args.output, markdown) {
        eprintln!("Error: Failed to write '{}': {}", args.output.display(), e);
        std::process::exit(1);
    }
    println!("Documentation generated: {}", args.output.display());
}

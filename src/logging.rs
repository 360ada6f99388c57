//! Logging setup.
//!
//! Records go to stderr, since stdout carries the JSON-RPC stream, and
//! optionally to an append-only log file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{McpError, Result};

const DEFAULT_DIRECTIVE: &str = "squashtm_mcp=info";
const VERBOSE_DIRECTIVE: &str = "squashtm_mcp=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over the default `info` level; `verbose`
/// raises this crate to `debug` on top of it.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = env_filter(verbose)?;
    let file_layer = match log_file {
        Some(path) => Some(file_layer(open_log_file(path)?)),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| McpError::Config(format!("failed to install logger: {}", e)))
}

fn env_filter(verbose: bool) -> Result<EnvFilter> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    if !verbose {
        return Ok(filter);
    }
    let directive = VERBOSE_DIRECTIVE
        .parse()
        .map_err(|e| McpError::Config(format!("invalid log directive: {}", e)))?;
    Ok(filter.add_directive(directive))
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| McpError::Config(format!("cannot open log file '{}': {}", path.display(), e)))
}

fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Arc::new(file))
}

//! MCP session state.
//!
//! Holds the SquashTM store shared by every tool call of a server run.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::remote::RemoteStore;

/// MCP session state.
///
/// The store is injected at construction; tools never reach for global
/// configuration. Each tool call draws a correlation id from the session so
/// its log records can be grouped.
pub struct McpSession {
    /// Remote SquashTM API
    store: Arc<dyn RemoteStore>,
    /// Number of tool calls handled so far
    calls: AtomicU64,
}

impl McpSession {
    /// Create a new MCP session over a remote store.
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            calls: AtomicU64::new(0),
        }
    }

    /// The remote store tools operate on.
    pub fn store(&self) -> &dyn RemoteStore {
        self.store.as_ref()
    }

    /// Allocate the correlation id of a new tool call.
    pub fn next_correlation_id(&self) -> String {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{:x}-{}", std::process::id(), n)
    }
}

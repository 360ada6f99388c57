//! Connection settings for the SquashTM REST API.

use std::time::Duration;

use crate::error::{McpError, Result};

/// Path of the REST API below the SquashTM base URL.
const API_PATH: &str = "/api/rest/latest";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Validated SquashTM connection settings.
#[derive(Clone)]
pub struct RemoteConfig {
    api_base: String,
    api_key: String,
    timeout: Duration,
}

impl RemoteConfig {
    /// Build a configuration from a SquashTM base URL and API token.
    ///
    /// A trailing `/` on the URL is ignored.
    pub fn new(url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return Err(McpError::Config("SquashTM URL must not be empty".to_string()));
        }
        reqwest::Url::parse(url)
            .map_err(|e| McpError::Config(format!("invalid SquashTM URL '{}': {}", url, e)))?;

        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(McpError::Config("SquashTM API key must not be empty".to_string()));
        }

        Ok(Self {
            api_base: format!("{}{}", url, API_PATH),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    /// Base URL of the REST API, without trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Bearer token sent with every request.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

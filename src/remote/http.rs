//! HTTP implementation of [`RemoteStore`] backed by `reqwest`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use serde_json::{Map, Value as JsonValue};

use crate::config::RemoteConfig;
use crate::error::{McpError, Result};
use crate::remote::RemoteStore;

/// SquashTM REST client.
///
/// Every request carries the bearer token from [`RemoteConfig`] and is
/// logged with a per-client sequence number. No retries are attempted.
pub struct SquashClient {
    http: reqwest::Client,
    config: RemoteConfig,
    request_counter: AtomicU64,
}

impl SquashClient {
    /// Create a client for the given configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| McpError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            request_counter: AtomicU64::new(0),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base(), path.trim_start_matches('/'))
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&JsonValue>,
    ) -> Result<JsonValue> {
        let request_no = self.request_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let body_text = body.map(|b| b.to_string());
        tracing::info!(
            request = request_no,
            method = %method,
            endpoint = path,
            body = body_text.as_deref().unwrap_or("<empty>"),
            "SquashTM REST API request"
        );

        let mut builder = self
            .http
            .request(method, self.url(path))
            .bearer_auth(self.config.api_key())
            .header(header::ACCEPT, "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(request = request_no, error = %e, "SquashTM REST API unreachable");
            McpError::from(e)
        })?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                request = request_no,
                status = status.as_u16(),
                payload = %text,
                "SquashTM REST API request failed"
            );
            return Err(McpError::RemoteRequestFailed {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        tracing::info!(
            request = request_no,
            status = status.as_u16(),
            payload = %text,
            "SquashTM REST API response"
        );

        if status == StatusCode::NO_CONTENT || text.is_empty() {
            return Ok(JsonValue::Object(Map::new()));
        }

        let is_json = content_type
            .as_deref()
            .map(|ct| ct.contains("application/json") || ct.contains("+json"))
            .unwrap_or(false);
        if !is_json {
            let m = format!("Unexpected SquashTM REST API response format: {}", text);
            tracing::error!(request = request_no, "{}", m);
            return Err(McpError::RemoteResponseMalformed(m));
        }

        serde_json::from_str(&text).map_err(|_| {
            let m = format!("Failed to parse SquashTM REST API JSON response: {}", text);
            tracing::error!(request = request_no, "{}", m);
            McpError::RemoteResponseMalformed(m)
        })
    }
}

#[async_trait]
impl RemoteStore for SquashClient {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<JsonValue> {
        self.request(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: &JsonValue) -> Result<JsonValue> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.request(Method::DELETE, path, &[], None).await?;
        Ok(())
    }
}

/// Pick the human-readable part of an error body.
///
/// SquashTM error bodies are usually JSON with a `message` field; anything
/// else is passed through as-is.
fn error_message(body: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(|m| m.as_str())
                .filter(|m| !m.is_empty())
                .map(|m| m.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(error_message(r#"{"message":"Project not found"}"#), "Project not found");
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(error_message("<html>oops</html>"), "<html>oops</html>");
        assert_eq!(error_message(r#"{"error":"x"}"#), r#"{"error":"x"}"#);
        assert_eq!(error_message(r#"{"message":""}"#), r#"{"message":""}"#);
    }

    #[test]
    fn test_url_joins_paths() {
        let cfg = RemoteConfig::new(
            "https://squash.example.com/",
            "tok",
            crate::config::DEFAULT_TIMEOUT,
        )
        .unwrap();
        let client = SquashClient::new(cfg).unwrap();
        assert_eq!(
            client.url("projects/4"),
            "https://squash.example.com/api/rest/latest/projects/4"
        );
        assert_eq!(
            client.url("/projects"),
            "https://squash.example.com/api/rest/latest/projects"
        );
    }
}

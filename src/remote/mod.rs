//! Access to the SquashTM REST API.
//!
//! Core logic talks to SquashTM only through the [`RemoteStore`] trait, so it
//! can be exercised against an in-memory store in tests. [`SquashClient`] is
//! the HTTP implementation used by the server binary.

mod http;
pub mod types;

pub use http::SquashClient;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::error::{McpError, Result};
use types::PagedResponse;

/// Page size used for every paginated listing.
pub const PAGE_SIZE: u32 = 50;

/// A remote object API addressed by resource path.
///
/// Paths are relative to the REST API root (e.g. `projects/12`). Every
/// non-success answer is reported as [`McpError::RemoteRequestFailed`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch a resource.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<JsonValue>;

    /// Create a resource. Returns the created representation (carrying its `id`).
    async fn post(&self, path: &str, body: &JsonValue) -> Result<JsonValue>;

    /// Delete a resource.
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Decode a remote JSON body into a typed structure.
pub fn decode<T: DeserializeOwned>(path: &str, value: JsonValue) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        McpError::RemoteResponseMalformed(format!(
            "Unexpected SquashTM REST API response shape for '{}': {}",
            path, e
        ))
    })
}

/// GET a resource and decode it.
pub async fn fetch<T: DeserializeOwned>(store: &dyn RemoteStore, path: &str) -> Result<T> {
    let value = store.get(path, &[]).await?;
    decode(path, value)
}

/// Fetch every page of a paginated listing.
///
/// Pages are requested in order starting at 0 while `page.number <
/// page.totalPages`. Items under `_embedded.<embedded_key>` are concatenated
/// in page order. A response without page information ends the loop.
pub async fn fetch_all_pages(
    store: &dyn RemoteStore,
    path: &str,
    query: &[(&str, String)],
    embedded_key: &str,
) -> Result<Vec<JsonValue>> {
    let mut items = Vec::new();
    let mut current_page: u64 = 0;
    let mut total_pages: u64 = 1;

    while current_page < total_pages {
        let mut page_query: Vec<(&str, String)> = query.to_vec();
        page_query.push(("page", current_page.to_string()));
        page_query.push(("size", PAGE_SIZE.to_string()));

        let value = store.get(path, &page_query).await?;
        let mut response: PagedResponse = decode(path, value)?;

        if let Some(mut page_items) = response.embedded.remove(embedded_key) {
            items.append(&mut page_items);
        }

        match response.page {
            Some(page) => {
                total_pages = page.total_pages;
                current_page += 1;
            }
            None => break,
        }
    }

    tracing::debug!(path, count = items.len(), "fetched paginated listing");
    Ok(items)
}

/// Keep only the embedded items whose `_type` matches.
pub fn filter_by_type(items: Vec<JsonValue>, type_name: &str) -> Vec<JsonValue> {
    items
        .into_iter()
        .filter(|item| item.get("_type").and_then(|t| t.as_str()) == Some(type_name))
        .collect()
}

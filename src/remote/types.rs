//! Typed views of SquashTM REST responses.
//!
//! Only the fields the tools read are declared; everything else the API
//! returns is ignored. Fields SquashTM may omit or null out are `Option`s.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Pagination block of a listing response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Requested page size.
    #[serde(default)]
    pub size: u64,
    /// Number of items across all pages.
    #[serde(default)]
    pub total_elements: u64,
    /// Number of pages.
    pub total_pages: u64,
    /// Zero-based index of this page.
    pub number: u64,
}

/// A HAL listing: embedded items under a resource-specific key.
#[derive(Debug, Clone, Deserialize)]
pub struct PagedResponse {
    /// Items of this page, by embedded key.
    #[serde(rename = "_embedded", default)]
    pub embedded: HashMap<String, Vec<JsonValue>>,
    /// Pagination block; absent on unpaginated listings.
    #[serde(default)]
    pub page: Option<PageInfo>,
}

/// Body returned by every create call; also the minimal view of a listed item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedResource {
    /// Identifier assigned by SquashTM.
    pub id: u64,
}

/// Reference to an item's parent.
#[derive(Debug, Clone, Deserialize)]
pub struct ParentLink {
    /// `_type` of the parent (`project` or a folder type).
    #[serde(rename = "_type")]
    pub type_name: String,
    /// Parent identifier.
    pub id: u64,
}

/// A project summary or detail.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    /// Project identifier.
    pub id: u64,
    /// Project name.
    pub name: String,
    /// Short label, often empty.
    #[serde(default)]
    pub label: Option<String>,
    /// Rich-text description, often empty.
    #[serde(default)]
    pub description: Option<String>,
}

/// One project entry of a folder tree response.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectTree {
    /// Project identifier.
    pub id: u64,
    /// Project name.
    #[serde(default)]
    pub name: String,
    /// Top-level nodes of the library.
    #[serde(default)]
    pub folders: Vec<FolderNode>,
}

/// A node of the raw folder tree.
///
/// The nesting mirrors remote storage and may mix folder kinds; it is not
/// used to rebuild the hierarchy.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderNode {
    /// `_type` of the node; not always a folder.
    #[serde(rename = "_type")]
    pub type_name: String,
    /// Node identifier.
    pub id: u64,
    /// Node name.
    #[serde(default)]
    pub name: String,
    /// Self link.
    #[serde(default)]
    pub url: Option<String>,
    /// Nested nodes.
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

/// Detail view of a single folder.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderDetails {
    /// Folder name.
    pub name: String,
    /// Rich-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// The project or folder the folder sits in.
    pub parent: ParentLink,
    /// Login of the creator.
    #[serde(default)]
    pub created_by: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_on: String,
    /// Login of the last modifier.
    #[serde(default)]
    pub last_modified_by: Option<String>,
    /// Last modification timestamp.
    #[serde(default)]
    pub last_modified_on: Option<String>,
}

/// Detail view of a requirement; most fields live on its current version.
#[derive(Debug, Clone, Deserialize)]
pub struct RequirementDetails {
    /// Requirement identifier.
    pub id: u64,
    /// Requirement name.
    pub name: String,
    /// The version currently in effect.
    pub current_version: RequirementVersion,
}

/// The current version of a requirement.
#[derive(Debug, Clone, Deserialize)]
pub struct RequirementVersion {
    /// Reference, often empty.
    #[serde(default)]
    pub reference: Option<String>,
    /// Rich-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Login of the creator.
    #[serde(default)]
    pub created_by: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_on: String,
    /// Login of the last modifier.
    #[serde(default)]
    pub last_modified_by: Option<String>,
    /// Last modification timestamp.
    #[serde(default)]
    pub last_modified_on: Option<String>,
}

/// Detail view of a test case.
#[derive(Debug, Clone, Deserialize)]
pub struct TestCaseDetails {
    /// Test case identifier.
    pub id: u64,
    /// Test case name.
    pub name: String,
    /// Reference, often empty.
    #[serde(default)]
    pub reference: Option<String>,
    /// Rich-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Rich-text prerequisite.
    #[serde(default)]
    pub prerequisite: Option<String>,
    /// Login of the creator.
    #[serde(default)]
    pub created_by: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_on: String,
    /// Login of the last modifier.
    #[serde(default)]
    pub last_modified_by: Option<String>,
    /// Last modification timestamp.
    #[serde(default)]
    pub last_modified_on: Option<String>,
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<TestStep>,
}

/// A test case step. Call steps carry neither action nor expected result.
#[derive(Debug, Clone, Deserialize)]
pub struct TestStep {
    /// What the tester does.
    #[serde(default)]
    pub action: Option<String>,
    /// What should happen.
    #[serde(default)]
    pub expected_result: Option<String>,
}

/// Treat an empty or missing string the same way: as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

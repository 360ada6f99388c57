//! Folder hierarchies of the requirement, test case and campaign libraries.
//!
//! SquashTM returns folder trees in a shape that cannot be trusted for
//! nesting, and only creates one folder per call. This module rebuilds clean
//! trees from per-folder details ([`fetch_tree`], [`build_tree`]) and creates
//! whole nested structures one node at a time ([`create_folders`]).

mod create;
mod fetch;
mod tree;

pub use create::create_folders;
pub use fetch::{fetch_tree, flatten_ids};
pub use tree::build_tree;

use serde::{Deserialize, Serialize};

use crate::remote::types::{non_empty, FolderDetails};

/// The three folder kinds SquashTM knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderKind {
    /// Folders of the requirement library.
    Requirement,
    /// Folders of the test case library.
    TestCase,
    /// Folders of the campaign library.
    Campaign,
}

impl FolderKind {
    /// The `_type` discriminator of folders of this kind.
    pub fn type_name(self) -> &'static str {
        match self {
            FolderKind::Requirement => "requirement-folder",
            FolderKind::TestCase => "test-case-folder",
            FolderKind::Campaign => "campaign-folder",
        }
    }

    /// The REST collection holding folders of this kind.
    pub fn resource(self) -> &'static str {
        match self {
            FolderKind::Requirement => "requirement-folders",
            FolderKind::TestCase => "test-case-folders",
            FolderKind::Campaign => "campaign-folders",
        }
    }

    /// Human-readable name, used in messages.
    pub fn label(self) -> &'static str {
        match self {
            FolderKind::Requirement => "Requirement folder",
            FolderKind::TestCase => "Test case folder",
            FolderKind::Campaign => "Campaign folder",
        }
    }
}

/// Where a new folder is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRef {
    /// The root of a project's library.
    Project(u64),
    /// An existing folder.
    Folder(FolderKind, u64),
}

impl ParentRef {
    /// Resolve the parent of a top-level folder to create.
    ///
    /// An explicit parent folder wins; otherwise the folder goes to the
    /// root of the project's library.
    pub fn resolve(project_id: u64, parent_folder_id: Option<u64>, kind: FolderKind) -> Self {
        match parent_folder_id {
            Some(id) => ParentRef::Folder(kind, id),
            None => ParentRef::Project(project_id),
        }
    }

    /// The `_type` the API expects in the `parent` reference.
    pub fn type_name(self) -> &'static str {
        match self {
            ParentRef::Project(_) => "project",
            ParentRef::Folder(kind, _) => kind.type_name(),
        }
    }

    /// Identifier of the parent.
    pub fn id(self) -> u64 {
        match self {
            ParentRef::Project(id) | ParentRef::Folder(_, id) => id,
        }
    }
}

/// A folder to create, with optional subfolders.
///
/// Depth is not validated here; a tool call is bounded by
/// [`MAX_MESSAGE_FOLDER_DEPTH`](crate::server::MAX_MESSAGE_FOLDER_DEPTH).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderSpec {
    /// Folder name.
    pub name: String,
    /// Rich-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Subfolders, created in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FolderSpec>,
}

/// A created folder with its assigned identifier.
///
/// `children[i]` is the folder created from `FolderSpec.children[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedFolder {
    /// Folder name.
    pub name: String,
    /// Identifier assigned by SquashTM.
    pub id: u64,
    /// Created subfolders.
    pub children: Vec<CreatedFolder>,
}

/// Flat detail record of one folder.
///
/// `parent_id` is only set when the parent is a folder of the same kind;
/// folders attached to the project root have none.
#[derive(Debug, Clone, PartialEq)]
pub struct FolderDetail {
    /// Folder identifier.
    pub id: u64,
    /// Folder name.
    pub name: String,
    /// Rich-text description, absent when empty.
    pub description: Option<String>,
    /// Parent folder identifier.
    pub parent_id: Option<u64>,
    /// `_type` of the parent as reported by the API.
    pub parent_type: String,
    /// Login of the creator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_on: String,
    /// Login of the last modifier.
    pub modified_by: Option<String>,
    /// Last modification timestamp.
    pub modified_on: Option<String>,
}

impl FolderDetail {
    /// Convert a folder detail response into a flat record.
    pub fn from_remote(id: u64, details: FolderDetails, kind: FolderKind) -> Self {
        let parent_id = (details.parent.type_name == kind.type_name()).then_some(details.parent.id);
        Self {
            id,
            name: details.name,
            description: non_empty(details.description),
            parent_id,
            parent_type: details.parent.type_name,
            created_by: details.created_by,
            created_on: details.created_on,
            modified_by: non_empty(details.last_modified_by),
            modified_on: non_empty(details.last_modified_on),
        }
    }
}

/// A folder of a rebuilt tree, as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnedFolder {
    /// Folder identifier.
    pub id: u64,
    /// Folder name.
    pub name: String,
    /// Rich-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Login of the creator.
    pub created_by: String,
    /// Creation timestamp.
    pub created_on: String,
    /// Login of the last modifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    /// Last modification timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_on: Option<String>,
    /// Subfolders.
    pub children: Vec<ReturnedFolder>,
}

impl ReturnedFolder {
    /// Number of folders in this subtree, including itself.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ReturnedFolder::count).sum::<usize>()
    }
}

impl From<&FolderDetail> for ReturnedFolder {
    fn from(detail: &FolderDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name.clone(),
            description: detail.description.clone(),
            created_by: detail.created_by.clone(),
            created_on: detail.created_on.clone(),
            modified_by: detail.modified_by.clone(),
            modified_on: detail.modified_on.clone(),
            children: Vec::new(),
        }
    }
}

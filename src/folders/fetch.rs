//! Fetch a project's folder tree for one folder kind.

use std::collections::HashSet;

use futures::future::try_join_all;

use super::{build_tree, FolderDetail, FolderKind, ReturnedFolder};
use crate::error::Result;
use crate::remote::types::{FolderDetails, FolderNode, ProjectTree};
use crate::remote::{fetch, RemoteStore};

/// Fetch the folders of `kind` in a project and return them as a tree.
///
/// The nesting of the tree endpoint is only used to discover folder ids;
/// the hierarchy itself is rebuilt from each folder's `parent` reference.
/// Detail requests are issued concurrently. Any failed request fails the
/// whole call.
pub async fn fetch_tree(
    store: &dyn RemoteStore,
    project_id: u64,
    kind: FolderKind,
) -> Result<Vec<ReturnedFolder>> {
    let tree_path = format!("{}/tree/{}", kind.resource(), project_id);
    let projects: Vec<ProjectTree> = fetch(store, &tree_path).await?;

    let ids = flatten_ids(&projects, kind);
    tracing::debug!(project_id, kind = kind.type_name(), count = ids.len(), "folders found in tree");

    let details = try_join_all(ids.into_iter().map(|id| fetch_detail(store, id, kind))).await?;

    Ok(build_tree(&details))
}

/// Collect, depth-first, the ids of every folder of `kind` in the raw tree.
///
/// Folders of another kind are skipped but still descended into. A folder
/// listed at several places is kept at its first position only.
pub fn flatten_ids(projects: &[ProjectTree], kind: FolderKind) -> Vec<u64> {
    fn walk(node: &FolderNode, kind: FolderKind, seen: &mut HashSet<u64>, out: &mut Vec<u64>) {
        if node.type_name == kind.type_name() && seen.insert(node.id) {
            out.push(node.id);
        }
        for child in &node.children {
            walk(child, kind, seen, out);
        }
    }

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for project in projects {
        for folder in &project.folders {
            walk(folder, kind, &mut seen, &mut ids);
        }
    }
    ids
}

async fn fetch_detail(store: &dyn RemoteStore, id: u64, kind: FolderKind) -> Result<FolderDetail> {
    let path = format!("{}/{}", kind.resource(), id);
    let details: FolderDetails = fetch(store, &path).await?;
    Ok(FolderDetail::from_remote(id, details, kind))
}

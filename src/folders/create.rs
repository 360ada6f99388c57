//! Create a nested folder structure, one folder per request.

use futures::future::{BoxFuture, FutureExt};
use serde::Serialize;

use super::{CreatedFolder, FolderKind, FolderSpec, ParentRef};
use crate::error::Result;
use crate::remote::types::CreatedResource;
use crate::remote::{decode, RemoteStore};

#[derive(Serialize)]
struct ParentPayload {
    #[serde(rename = "_type")]
    type_name: &'static str,
    id: u64,
}

#[derive(Serialize)]
struct FolderPayload<'a> {
    #[serde(rename = "_type")]
    type_name: &'static str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    parent: ParentPayload,
}

/// Create `spec` and all its subfolders below `parent`.
///
/// Folders are created depth-first and strictly one after the other: a
/// child is only created once its parent's id is known, and siblings follow
/// their input order. The first failure aborts the whole operation; folders
/// created before it are left in place.
pub async fn create_folders(
    store: &dyn RemoteStore,
    project_id: u64,
    spec: &FolderSpec,
    parent: ParentRef,
    kind: FolderKind,
) -> Result<CreatedFolder> {
    let mut created = Vec::new();
    let result = create_node(store, spec, parent, kind, &mut created).await;

    if let Err(err) = &result {
        if !created.is_empty() {
            tracing::warn!(
                project_id,
                kind = kind.type_name(),
                created = ?created,
                error = %err,
                "folder creation aborted, already created folders were not removed"
            );
        }
    }
    result
}

fn create_node<'a>(
    store: &'a dyn RemoteStore,
    spec: &'a FolderSpec,
    parent: ParentRef,
    kind: FolderKind,
    created: &'a mut Vec<u64>,
) -> BoxFuture<'a, Result<CreatedFolder>> {
    async move {
        let payload = serde_json::to_value(FolderPayload {
            type_name: kind.type_name(),
            name: &spec.name,
            description: spec.description.as_deref(),
            parent: ParentPayload {
                type_name: parent.type_name(),
                id: parent.id(),
            },
        })?;

        tracing::info!(
            name = %spec.name,
            parent_type = parent.type_name(),
            parent_id = parent.id(),
            "creating folder"
        );
        let response = store.post(kind.resource(), &payload).await?;
        let id = decode::<CreatedResource>(kind.resource(), response)?.id;
        created.push(id);

        let mut children = Vec::with_capacity(spec.children.len());
        for child in &spec.children {
            let node = create_node(store, child, ParentRef::Folder(kind, id), kind, created).await?;
            children.push(node);
        }

        Ok(CreatedFolder {
            name: spec.name.clone(),
            id,
            children,
        })
    }
    .boxed()
}

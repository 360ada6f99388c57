//! Folder tools, one set per folder kind.
//!
//! Tools: get_requirement_folders_tree, get_test_case_folder_tree, get_campaign_folder_tree,
//!        create_requirement_folders, create_test_case_folders, create_campaign_folders,
//!        delete_requirement_folder, delete_test_case_folder, delete_campaign_folder

use serde_json::{Map, Value as JsonValue};

use crate::convert::{
    check_known_args, get_optional_string, get_optional_u64, get_string_arg, get_typed_arg,
    get_u64_arg, non_empty, optional_non_empty,
};
use crate::error::{McpError, Result};
use crate::folders::{create_folders, fetch_tree, FolderKind, FolderSpec, ParentRef};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{array_of, describe, message_output, ToolDef};

const KINDS: [FolderKind; 3] = [FolderKind::Requirement, FolderKind::TestCase, FolderKind::Campaign];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Tree,
    Create,
    Delete,
}

fn tool_name(action: Action, kind: FolderKind) -> &'static str {
    match (action, kind) {
        (Action::Tree, FolderKind::Requirement) => "get_requirement_folders_tree",
        (Action::Tree, FolderKind::TestCase) => "get_test_case_folder_tree",
        (Action::Tree, FolderKind::Campaign) => "get_campaign_folder_tree",
        (Action::Create, FolderKind::Requirement) => "create_requirement_folders",
        (Action::Create, FolderKind::TestCase) => "create_test_case_folders",
        (Action::Create, FolderKind::Campaign) => "create_campaign_folders",
        (Action::Delete, FolderKind::Requirement) => "delete_requirement_folder",
        (Action::Delete, FolderKind::TestCase) => "delete_test_case_folder",
        (Action::Delete, FolderKind::Campaign) => "delete_campaign_folder",
    }
}

fn route(name: &str) -> Option<(Action, FolderKind)> {
    [Action::Tree, Action::Create, Action::Delete]
        .into_iter()
        .flat_map(|action| KINDS.into_iter().map(move |kind| (action, kind)))
        .find(|&(action, kind)| tool_name(action, kind) == name)
}

/// Lower-case noun used in descriptions ("requirement", "test case", ...).
fn noun(kind: FolderKind) -> &'static str {
    match kind {
        FolderKind::Requirement => "requirement",
        FolderKind::TestCase => "test case",
        FolderKind::Campaign => "campaign",
    }
}

fn ref_to(def: &str) -> JsonValue {
    serde_json::json!({ "$ref": format!("#/$defs/{}", def) })
}

fn with_defs(mut schema: JsonValue, name: &str, def: JsonValue) -> JsonValue {
    let mut defs = Map::new();
    defs.insert(name.to_string(), def);
    if let Some(obj) = schema.as_object_mut() {
        obj.insert("$defs".to_string(), JsonValue::Object(defs));
    }
    schema
}

fn returned_folder_schema() -> JsonValue {
    schema!(object {
        required: {
            "id": integer => "The ID of the folder",
            "name": string => "The name of the folder",
            "created_by": string => "The user who created the folder",
            "created_on": string => "The date when the folder was created",
            "children": (array_of(ref_to("returned_folder"))) => "Subfolders"
        },
        optional: {
            "description": string => "The description of the folder (rich text) (absent if the folder has no description)",
            "modified_by": string => "The user who last modified the folder (absent if the folder has never been modified)",
            "modified_on": string => "The date when the folder was last modified (absent if the folder has never been modified)"
        }
    })
}

fn folder_structure_schema() -> JsonValue {
    describe(
        schema!(object {
            required: { "name": string => "Name of the folder" },
            optional: {
                "description": string => "Description of the folder (rich text)",
                "children": (array_of(ref_to("folder_structure"))) => "Subfolders"
            }
        }),
        "Folder structure",
    )
}

fn created_folder_schema() -> JsonValue {
    describe(
        schema!(object {
            required: {
                "name": string => "Name of the folder",
                "id": integer => "ID of the folder",
                "children": (array_of(ref_to("created_folder"))) => "Subfolders"
            }
        }),
        "Folder structure",
    )
}

fn tree_tool(kind: FolderKind) -> ToolDef {
    let description = match kind {
        FolderKind::Campaign => {
            "Get the campaign folders tree for specified project with detailed folder info".to_string()
        }
        _ => format!(
            "Get the {} folders tree for specified project with detailed folder info in SquashTM",
            noun(kind)
        ),
    };
    let input = schema!(object {
        required: {
            "project_id": integer => format!("Project ID to retrieve the {} folders tree for", noun(kind))
        }
    });

    ToolDef::new(tool_name(Action::Tree, kind), &description, input).with_output(with_defs(
        schema!(object {
            required: { "folders": (array_of(ref_to("returned_folder"))) => "List of folders" }
        }),
        "returned_folder",
        returned_folder_schema(),
    ))
}

fn create_tool(kind: FolderKind) -> ToolDef {
    let input = schema!(object {
        required: {
            "project_id": integer => format!("The ID of the project in which to create the {} folder", noun(kind)),
            "name": string => "Name of the folder"
        },
        optional: {
            "parent_folder_id": integer => "The ID of an existing folder into which create the new folders (optional, if not specified, the folders will be created at the root level)",
            "description": string => "Description of the folder (rich text)",
            "children": (array_of(ref_to("folder_structure"))) => "Subfolders"
        }
    });

    ToolDef::new(
        tool_name(Action::Create, kind),
        &format!("Create {} folders recursively in SquashTM", noun(kind)),
        with_defs(input, "folder_structure", folder_structure_schema()),
    )
    .with_output(with_defs(
        schema!(object {
            required: { "folder": (ref_to("created_folder")) => "The created folder and its subfolders" }
        }),
        "created_folder",
        created_folder_schema(),
    ))
}

fn delete_tool(kind: FolderKind) -> ToolDef {
    let input = schema!(object {
        required: {
            "folder_id": integer => format!("The ID of the {} folder to delete", noun(kind))
        }
    });

    ToolDef::new(
        tool_name(Action::Delete, kind),
        &format!("Delete a {} folder and its content in SquashTM", noun(kind)),
        input,
    )
    .with_output(message_output(&format!(
        "Message indicating success of the deletion of the {} folder",
        noun(kind)
    )))
}

/// Get all folder tool definitions.
pub fn tools() -> Vec<ToolDef> {
    let mut tools = Vec::new();
    for kind in KINDS {
        tools.push(tree_tool(kind));
    }
    for kind in KINDS {
        tools.push(create_tool(kind));
        tools.push(delete_tool(kind));
    }
    tools
}

/// Dispatch a folder tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    let (action, kind) = route(name).ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

    match action {
        Action::Tree => {
            check_known_args(&args, &["project_id"])?;
            let project_id = get_u64_arg(&args, "project_id")?;

            let folders = fetch_tree(session.store(), project_id, kind).await?;
            tracing::debug!(project_id, roots = folders.len(), "folder tree rebuilt");
            Ok(serde_json::json!({ "folders": folders }))
        }

        Action::Create => {
            check_known_args(
                &args,
                &["project_id", "parent_folder_id", "name", "description", "children"],
            )?;
            let project_id = get_u64_arg(&args, "project_id")?;
            let parent_folder_id = get_optional_u64(&args, "parent_folder_id")?;
            let children = match args.get("children") {
                None | Some(JsonValue::Null) => Vec::new(),
                Some(_) => get_typed_arg::<Vec<FolderSpec>>(&args, "children")?,
            };
            let spec = normalize(FolderSpec {
                name: get_string_arg(&args, "name")?,
                description: get_optional_string(&args, "description")?,
                children,
            })?;

            let parent = ParentRef::resolve(project_id, parent_folder_id, kind);
            let folder = create_folders(session.store(), project_id, &spec, parent, kind).await?;
            Ok(serde_json::json!({ "folder": folder }))
        }

        Action::Delete => {
            check_known_args(&args, &["folder_id"])?;
            let folder_id = get_u64_arg(&args, "folder_id")?;

            let path = format!("{}/{}", kind.resource(), folder_id);
            session.store().delete(&path).await?;
            Ok(serde_json::json!({
                "message": format!("{} {} deleted successfully", kind.label(), folder_id)
            }))
        }
    }
}

/// Trim names and descriptions of a whole folder structure.
fn normalize(spec: FolderSpec) -> Result<FolderSpec> {
    Ok(FolderSpec {
        name: non_empty("name", &spec.name)?,
        description: optional_non_empty("description", spec.description.as_deref())?,
        children: spec
            .children
            .into_iter()
            .map(normalize)
            .collect::<Result<Vec<_>>>()?,
    })
}

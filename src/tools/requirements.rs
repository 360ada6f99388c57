//! Requirement tools.
//!
//! Tools: get_requirement_folder_content, create_requirements, delete_requirement

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::convert::{
    check_known_args, get_optional_u64, get_typed_arg, get_u64_arg, non_empty, optional_non_empty,
};
use crate::error::{McpError, Result};
use crate::folders::{FolderKind, ParentRef};
use crate::remote::types::{non_empty as present, CreatedResource, RequirementDetails};
use crate::remote::{decode, fetch, fetch_all_pages, filter_by_type, RemoteStore};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{array_of, message_output, ToolDef};

/// Requirement as listed by `get_requirement_folder_content`.
#[derive(Debug, Serialize)]
struct RequirementSummary {
    id: u64,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    description: String,
    created_by: String,
    created_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified_on: Option<String>,
}

impl From<RequirementDetails> for RequirementSummary {
    fn from(details: RequirementDetails) -> Self {
        let version = details.current_version;
        Self {
            id: details.id,
            name: details.name,
            reference: present(version.reference),
            description: version.description.unwrap_or_default(),
            created_by: version.created_by,
            created_on: version.created_on,
            last_modified_by: present(version.last_modified_by),
            last_modified_on: present(version.last_modified_on),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NewRequirement {
    name: String,
    #[serde(default)]
    reference: Option<String>,
    description: String,
}

/// Requirement as returned by `create_requirements`.
#[derive(Debug, Serialize)]
struct CreatedRequirement {
    id: u64,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
}

/// Get all requirement tool definitions.
pub fn tools() -> Vec<ToolDef> {
    let listed = schema!(object {
        required: {
            "id": integer => "The ID of the requirement",
            "name": string => "The name of the requirement",
            "description": string => "The description of the requirement (rich text)",
            "created_by": string => "Who created the requirement",
            "created_on": string => "Creation timestamp"
        },
        optional: {
            "reference": string => "The reference of the requirement (absent if the requirement has no reference)",
            "last_modified_by": string => "Who last modified the requirement (absent if the requirement has not been modified since creation)",
            "last_modified_on": string => "Last modification timestamp (absent if the requirement has not been modified since creation)"
        }
    });
    let new_requirement = schema!(object {
        required: {
            "name": string => "The name of the requirement",
            "description": string => "The description of the requirement (rich text)"
        },
        optional: {
            "reference": string => "The reference of the requirement (absent if the requirement has no reference)"
        }
    });
    let created = schema!(object {
        required: {
            "id": integer => "The ID of the created requirement",
            "name": string => "The name of the created requirement"
        },
        optional: {
            "reference": string => "The reference of the created requirement (absent if the requirement has no reference)"
        }
    });

    vec![
        ToolDef::new(
            "get_requirement_folder_content",
            "Get the requirements of a requirement folder (only includes the requirements, not the subfolders) in SquashTM",
            schema!(object {
                required: {
                    "project_id": integer => "The ID of the project in which to retrieve the requirement folder content"
                },
                optional: {
                    "folder_id": integer => "The ID of the requirement folder to retrieve content for (optional, if not specified, the requirements of the project root will be retrieved)"
                }
            }),
        )
        .with_output(schema!(object {
            required: { "requirements": (array_of(listed)) => "The requirements of the folder" }
        })),
        ToolDef::new(
            "create_requirements",
            "Create requirements in a project or folder in SquashTM",
            schema!(object {
                required: {
                    "project_id": integer => "The ID of the project in which to create the requirements",
                    "requirements": (array_of(new_requirement)) => "The list of requirements to create"
                },
                optional: {
                    "parent_folder_id": integer => "The ID of an existing folder into which create the new requirements (optional, if not specified, the requirements will be created at the root level)"
                }
            }),
        )
        .with_output(schema!(object {
            required: { "requirements": (array_of(created)) => "The created requirements" }
        })),
        ToolDef::new(
            "delete_requirement",
            "Delete a requirement in SquashTM",
            schema!(object {
                required: { "id": integer => "The ID of the requirement to delete" }
            }),
        )
        .with_output(message_output(
            "Message indicating success of the deletion of the requirement",
        )),
    ]
}

/// Dispatch a requirement tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "get_requirement_folder_content" => {
            check_known_args(&args, &["project_id", "folder_id"])?;
            let project_id = get_u64_arg(&args, "project_id")?;
            let folder_id = get_optional_u64(&args, "folder_id")?;

            let requirements = folder_content(session.store(), project_id, folder_id).await?;
            Ok(serde_json::json!({ "requirements": requirements }))
        }

        "create_requirements" => {
            check_known_args(&args, &["project_id", "parent_folder_id", "requirements"])?;
            let project_id = get_u64_arg(&args, "project_id")?;
            let parent_folder_id = get_optional_u64(&args, "parent_folder_id")?;
            let requirements = validate(get_typed_arg(&args, "requirements")?)?;

            let parent = ParentRef::resolve(project_id, parent_folder_id, FolderKind::Requirement);
            let created = create_requirements(session.store(), parent, requirements).await?;
            Ok(serde_json::json!({ "requirements": created }))
        }

        "delete_requirement" => {
            check_known_args(&args, &["id"])?;
            let id = get_u64_arg(&args, "id")?;
            session.store().delete(&format!("requirements/{}", id)).await?;
            Ok(serde_json::json!({
                "message": format!("Requirement {} deleted successfully", id)
            }))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

async fn folder_content(
    store: &dyn RemoteStore,
    project_id: u64,
    folder_id: Option<u64>,
) -> Result<Vec<RequirementSummary>> {
    let (path, key) = match folder_id {
        Some(id) => (format!("requirement-folders/{}/content", id), "content"),
        None => (
            format!("projects/{}/requirements-library/content", project_id),
            "requirement-library-content",
        ),
    };

    let items = filter_by_type(fetch_all_pages(store, &path, &[], key).await?, "requirement");
    let listed: Vec<CreatedResource> = decode(&path, JsonValue::Array(items))?;

    try_join_all(listed.into_iter().map(|item| async move {
        let details: RequirementDetails = fetch(store, &format!("requirements/{}", item.id)).await?;
        Ok::<_, McpError>(RequirementSummary::from(details))
    }))
    .await
}

/// Trim the fields of every new requirement before anything is created.
fn validate(requirements: Vec<NewRequirement>) -> Result<Vec<NewRequirement>> {
    if requirements.is_empty() {
        return Err(McpError::InvalidArg {
            name: "requirements".to_string(),
            reason: "At least one requirement is required".to_string(),
        });
    }
    requirements
        .into_iter()
        .map(|r| -> Result<NewRequirement> {
            Ok(NewRequirement {
                name: non_empty("name", &r.name)?,
                reference: optional_non_empty("reference", r.reference.as_deref())?,
                description: non_empty("description", &r.description)?,
            })
        })
        .collect()
}

/// Create the requirements one after the other, in input order.
async fn create_requirements(
    store: &dyn RemoteStore,
    parent: ParentRef,
    requirements: Vec<NewRequirement>,
) -> Result<Vec<CreatedRequirement>> {
    let mut created = Vec::with_capacity(requirements.len());

    for requirement in requirements {
        let mut version = serde_json::json!({
            "_type": "requirement-version",
            "name": requirement.name,
            "criticality": "UNDEFINED",
            "category": { "code": "CAT_UNDEFINED" },
            "status": "WORK_IN_PROGRESS",
            "description": requirement.description,
        });
        if let Some(reference) = &requirement.reference {
            version["reference"] = JsonValue::String(reference.clone());
        }
        let payload = serde_json::json!({
            "_type": "requirement",
            "current_version": version,
            "parent": { "_type": parent.type_name(), "id": parent.id() },
        });

        let response = store.post("requirements", &payload).await?;
        let id = decode::<CreatedResource>("requirements", response)?.id;
        tracing::info!(id, name = %requirement.name, "requirement created");

        created.push(CreatedRequirement {
            id,
            name: requirement.name,
            reference: requirement.reference,
        });
    }

    Ok(created)
}

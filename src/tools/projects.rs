//! Project tools.
//!
//! Tools: list_projects, create_project, delete_project

use futures::future::try_join_all;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::convert::{check_known_args, get_optional_string, get_string_arg, get_u64_arg};
use crate::error::{McpError, Result};
use crate::remote::types::{non_empty, CreatedResource, Project};
use crate::remote::{decode, fetch, fetch_all_pages, RemoteStore};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{array_of, message_output, ToolDef};

#[derive(Debug, Serialize)]
struct ProjectSummary {
    id: u64,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

#[derive(Serialize)]
struct ProjectPayload<'a> {
    #[serde(rename = "_type")]
    type_name: &'static str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Get all project tool definitions.
pub fn tools() -> Vec<ToolDef> {
    let project = schema!(object {
        required: {
            "id": integer => "The ID of the project",
            "name": string => "The name of the project"
        },
        optional: {
            "label": string => "The label of the project",
            "description": string => "The description of the project (rich text)"
        }
    });

    vec![
        ToolDef::new("list_projects", "Get list of SquashTM projects", schema!(object {}))
            .with_output(schema!(object {
                required: { "projects": (array_of(project)) => "The SquashTM projects" }
            })),
        ToolDef::new(
            "create_project",
            "Create a new project in SquashTM",
            schema!(object {
                required: { "name": string => "The name of the project to create" },
                optional: {
                    "label": string => "The label of the project to create",
                    "description": string => "The description of the project to create (rich text)"
                }
            }),
        )
        .with_output(schema!(object {
            required: { "id": integer => "The ID of the newly created project" }
        })),
        ToolDef::new(
            "delete_project",
            "Delete a project in SquashTM",
            schema!(object {
                required: { "id": integer => "The ID of the project to delete" }
            }),
        )
        .with_output(message_output(
            "Message indicating success of the deletion of the project",
        )),
    ]
}

/// Dispatch a project tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "list_projects" => {
            check_known_args(&args, &[])?;
            let projects = list_projects(session.store()).await?;
            Ok(serde_json::json!({ "projects": projects }))
        }

        "create_project" => {
            check_known_args(&args, &["name", "label", "description"])?;
            let name = get_string_arg(&args, "name")?;
            let label = get_optional_string(&args, "label")?;
            let description = get_optional_string(&args, "description")?;

            let payload = serde_json::to_value(ProjectPayload {
                type_name: "project",
                name: &name,
                label: label.as_deref(),
                description: description.as_deref(),
            })?;
            let response = session.store().post("projects", &payload).await?;
            let created: CreatedResource = decode("projects", response)?;
            tracing::info!(id = created.id, %name, "project created");
            Ok(serde_json::json!({ "id": created.id }))
        }

        "delete_project" => {
            check_known_args(&args, &["id"])?;
            let id = get_u64_arg(&args, "id")?;
            session.store().delete(&format!("projects/{}", id)).await?;
            Ok(serde_json::json!({
                "message": format!("Project {} deleted successfully", id)
            }))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

/// List standard projects, completed with the label and description of
/// their detail record.
async fn list_projects(store: &dyn RemoteStore) -> Result<Vec<ProjectSummary>> {
    let listed = fetch_all_pages(
        store,
        "projects",
        &[("type", "STANDARD".to_string())],
        "projects",
    )
    .await?;
    let listed: Vec<Project> = decode("projects", JsonValue::Array(listed))?;

    try_join_all(listed.into_iter().map(|project| async move {
        let details: Project = fetch(store, &format!("projects/{}", project.id)).await?;
        Ok::<_, McpError>(ProjectSummary {
            id: project.id,
            name: project.name,
            label: non_empty(details.label),
            description: non_empty(details.description),
        })
    }))
    .await
}

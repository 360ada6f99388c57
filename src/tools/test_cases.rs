//! Test case tools.
//!
//! Tools: get_test_case_folder_content, create_test_cases, delete_test_case

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::convert::{
    check_known_args, get_optional_u64, get_typed_arg, get_u64_arg, non_empty, optional_non_empty,
};
use crate::error::{McpError, Result};
use crate::folders::{FolderKind, ParentRef};
use crate::remote::types::{non_empty as present, CreatedResource, TestCaseDetails};
use crate::remote::{decode, fetch, fetch_all_pages, filter_by_type, RemoteStore};
use crate::schema;
use crate::session::McpSession;
use crate::tools::{array_of, message_output, ToolDef};

#[derive(Debug, Serialize)]
struct TestCaseSummary {
    id: u64,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    prerequisite: Option<String>,
    created_by: String,
    created_on: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_modified_on: Option<String>,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct Step {
    action: String,
    expected_result: String,
}

impl From<TestCaseDetails> for TestCaseSummary {
    fn from(details: TestCaseDetails) -> Self {
        Self {
            id: details.id,
            name: details.name,
            reference: present(details.reference),
            description: details.description.unwrap_or_default(),
            prerequisite: present(details.prerequisite),
            created_by: details.created_by,
            created_on: details.created_on,
            last_modified_by: present(details.last_modified_by),
            last_modified_on: present(details.last_modified_on),
            steps: details
                .steps
                .into_iter()
                .map(|step| Step {
                    action: step.action.unwrap_or_default(),
                    expected_result: step.expected_result.unwrap_or_default(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NewTestCase {
    name: String,
    #[serde(default)]
    reference: Option<String>,
    description: String,
    #[serde(default)]
    prerequisite: Option<String>,
    #[serde(default)]
    steps: Option<Vec<Step>>,
}

#[derive(Debug, Serialize)]
struct CreatedTestCase {
    id: u64,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
}

/// Get all test case tool definitions.
pub fn tools() -> Vec<ToolDef> {
    let step = schema!(object {
        required: {
            "action": string => "The action to perform",
            "expected_result": string => "The expected result"
        }
    });
    let listed = schema!(object {
        required: {
            "id": integer => "The ID of the test case",
            "name": string => "The name of the test case",
            "description": string => "The description of the test case (rich text)",
            "created_by": string => "Who created the test case",
            "created_on": string => "Creation timestamp",
            "steps": (array_of(step.clone())) => "List of test steps"
        },
        optional: {
            "reference": string => "The reference of the test case (absent if the test case has no reference)",
            "prerequisite": string => "The prerequisite of the test case (rich text)",
            "last_modified_by": string => "Who last modified the test case (absent if the test case has not been modified since creation)",
            "last_modified_on": string => "Last modification timestamp (absent if the test case has not been modified since creation)"
        }
    });
    let new_test_case = schema!(object {
        required: {
            "name": string => "The name of the test case",
            "description": string => "The description of the test case (rich text)"
        },
        optional: {
            "reference": string => "The reference of the test case (absent if the test case has no reference)",
            "prerequisite": string => "The prerequisite of the test case (rich text)",
            "steps": (array_of(step)) => "List of test steps"
        }
    });
    let created = schema!(object {
        required: {
            "id": integer => "The ID of the created test case",
            "name": string => "The name of the created test case"
        },
        optional: {
            "reference": string => "The reference of the created test case (absent if the test case has no reference)"
        }
    });

    vec![
        ToolDef::new(
            "get_test_case_folder_content",
            "Get the test cases of a test case folder (only includes items of type 'test-case') in SquashTM",
            schema!(object {
                required: {
                    "project_id": integer => "The ID of the project in which to retrieve the test case folder content"
                },
                optional: {
                    "folder_id": integer => "The ID of the test case folder to retrieve content for (optional, if not specified, the test cases of the project root will be retrieved)"
                }
            }),
        )
        .with_output(schema!(object {
            required: { "test_cases": (array_of(listed)) => "The test cases of the folder" }
        })),
        ToolDef::new(
            "create_test_cases",
            "Create test cases in a project or folder in SquashTM",
            schema!(object {
                required: {
                    "project_id": integer => "The ID of the project in which to create the test cases",
                    "test_cases": (array_of(new_test_case)) => "The list of test cases to create"
                },
                optional: {
                    "parent_folder_id": integer => "The ID of an existing folder into which create the new test cases (optional, if not specified, the test cases will be created at the root level)"
                }
            }),
        )
        .with_output(schema!(object {
            required: { "test_cases": (array_of(created)) => "The created test cases" }
        })),
        ToolDef::new(
            "delete_test_case",
            "Delete a test case in SquashTM",
            schema!(object {
                required: { "id": integer => "The ID of the test case to delete" }
            }),
        )
        .with_output(message_output(
            "Message indicating success of the deletion of the test case",
        )),
    ]
}

/// Dispatch a test case tool call.
pub async fn dispatch(
    session: &McpSession,
    name: &str,
    args: Map<String, JsonValue>,
) -> Result<JsonValue> {
    match name {
        "get_test_case_folder_content" => {
            check_known_args(&args, &["project_id", "folder_id"])?;
            let project_id = get_u64_arg(&args, "project_id")?;
            let folder_id = get_optional_u64(&args, "folder_id")?;

            let test_cases = folder_content(session.store(), project_id, folder_id).await?;
            Ok(serde_json::json!({ "test_cases": test_cases }))
        }

        "create_test_cases" => {
            check_known_args(&args, &["project_id", "parent_folder_id", "test_cases"])?;
            let project_id = get_u64_arg(&args, "project_id")?;
            let parent_folder_id = get_optional_u64(&args, "parent_folder_id")?;
            let test_cases = validate(get_typed_arg(&args, "test_cases")?)?;

            let parent = ParentRef::resolve(project_id, parent_folder_id, FolderKind::TestCase);
            let created = create_test_cases(session.store(), parent, test_cases).await?;
            Ok(serde_json::json!({ "test_cases": created }))
        }

        "delete_test_case" => {
            check_known_args(&args, &["id"])?;
            let id = get_u64_arg(&args, "id")?;
            session.store().delete(&format!("test-cases/{}", id)).await?;
            Ok(serde_json::json!({
                "message": format!("Test case {} deleted successfully", id)
            }))
        }

        _ => Err(McpError::UnknownTool(name.to_string())),
    }
}

async fn folder_content(
    store: &dyn RemoteStore,
    project_id: u64,
    folder_id: Option<u64>,
) -> Result<Vec<TestCaseSummary>> {
    let (path, key) = match folder_id {
        Some(id) => (format!("test-case-folders/{}/content", id), "content"),
        None => (
            format!("projects/{}/test-cases-library/content", project_id),
            "test-case-library-content",
        ),
    };

    let items = filter_by_type(fetch_all_pages(store, &path, &[], key).await?, "test-case");
    let listed: Vec<CreatedResource> = decode(&path, JsonValue::Array(items))?;

    try_join_all(listed.into_iter().map(|item| async move {
        let details: TestCaseDetails = fetch(store, &format!("test-cases/{}", item.id)).await?;
        Ok::<_, McpError>(TestCaseSummary::from(details))
    }))
    .await
}

fn validate(test_cases: Vec<NewTestCase>) -> Result<Vec<NewTestCase>> {
    if test_cases.is_empty() {
        return Err(McpError::InvalidArg {
            name: "test_cases".to_string(),
            reason: "At least one test case is required".to_string(),
        });
    }
    test_cases
        .into_iter()
        .map(|tc| -> Result<NewTestCase> {
            let steps = match tc.steps {
                Some(steps) if steps.is_empty() => {
                    return Err(McpError::InvalidArg {
                        name: "steps".to_string(),
                        reason: "When given, at least one step is required".to_string(),
                    })
                }
                Some(steps) => Some(
                    steps
                        .into_iter()
                        .map(|s| -> Result<Step> {
                            Ok(Step {
                                action: non_empty("action", &s.action)?,
                                expected_result: non_empty("expected_result", &s.expected_result)?,
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                None => None,
            };
            Ok(NewTestCase {
                name: non_empty("name", &tc.name)?,
                reference: optional_non_empty("reference", tc.reference.as_deref())?,
                description: non_empty("description", &tc.description)?,
                prerequisite: optional_non_empty("prerequisite", tc.prerequisite.as_deref())?,
                steps,
            })
        })
        .collect()
}

/// Create the test cases one after the other, in input order.
async fn create_test_cases(
    store: &dyn RemoteStore,
    parent: ParentRef,
    test_cases: Vec<NewTestCase>,
) -> Result<Vec<CreatedTestCase>> {
    let mut created = Vec::with_capacity(test_cases.len());

    for tc in test_cases {
        let steps: Vec<JsonValue> = tc
            .steps
            .unwrap_or_default()
            .into_iter()
            .map(|step| {
                serde_json::json!({
                    "_type": "action-step",
                    "action": step.action,
                    "expected_result": step.expected_result,
                })
            })
            .collect();

        let mut payload = serde_json::json!({
            "_type": "test-case",
            "name": tc.name,
            "description": tc.description,
            "parent": { "_type": parent.type_name(), "id": parent.id() },
            "steps": steps,
        });
        if let Some(reference) = &tc.reference {
            payload["reference"] = JsonValue::String(reference.clone());
        }
        if let Some(prerequisite) = &tc.prerequisite {
            payload["prerequisite"] = JsonValue::String(prerequisite.clone());
        }

        let response = store.post("test-cases", &payload).await?;
        let id = decode::<CreatedResource>("test-cases", response)?.id;
        tracing::info!(id, name = %tc.name, "test case created");

        created.push(CreatedTestCase {
            id,
            name: tc.name,
            reference: tc.reference,
        });
    }

    Ok(created)
}

//! Integration tests for the MCP server.
//!
//! Tools run against `FakeSquash`, an in-memory stand-in for the SquashTM
//! REST API that answers the same paths and payload shapes.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};
use squashtm_mcp::remote::RemoteStore;
use squashtm_mcp::{JsonRpcRequest, McpError, McpServer, McpSession, Result, ToolRegistry};

// =============================================================================
// In-memory SquashTM
// =============================================================================

#[derive(Debug, Clone)]
struct Folder {
    id: u64,
    type_name: String,
    name: String,
    description: Option<String>,
    parent_type: String,
    parent_id: u64,
}

#[derive(Debug, Clone)]
struct Item {
    id: u64,
    type_name: String,
    body: JsonValue,
    parent_type: String,
    parent_id: u64,
}

#[derive(Default)]
struct State {
    next_id: u64,
    projects: Vec<(u64, String)>,
    folders: Vec<Folder>,
    items: Vec<Item>,
    gets: Vec<(String, Vec<(String, String)>)>,
    posts: Vec<(String, JsonValue)>,
    deletes: Vec<String>,
    /// Fail the POST with this index (0-based, counted over all posts).
    fail_post_at: Option<usize>,
}

struct FakeSquash {
    state: Mutex<State>,
    page_size: usize,
}

impl FakeSquash {
    fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 100,
                ..State::default()
            }),
            page_size: 2,
        }
    }

    fn with_projects(names: &[&str]) -> Self {
        let fake = Self::new();
        {
            let mut state = fake.state.lock().unwrap();
            for (i, name) in names.iter().enumerate() {
                state.projects.push((i as u64 + 1, name.to_string()));
            }
        }
        fake
    }

    fn fail_post_at(&self, index: usize) {
        self.state.lock().unwrap().fail_post_at = Some(index);
    }

    fn posts(&self) -> Vec<(String, JsonValue)> {
        self.state.lock().unwrap().posts.clone()
    }

    fn gets(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.state.lock().unwrap().gets.clone()
    }

    fn deletes(&self) -> Vec<String> {
        self.state.lock().unwrap().deletes.clone()
    }

    fn folder_count(&self) -> usize {
        self.state.lock().unwrap().folders.len()
    }
}

fn not_found(path: &str) -> McpError {
    McpError::RemoteRequestFailed {
        status: 404,
        message: format!("no resource at {}", path),
    }
}

fn audit() -> JsonValue {
    json!({
        "created_by": "admin",
        "created_on": "2024-03-01T10:00:00.000+00:00",
        "last_modified_by": null,
        "last_modified_on": null
    })
}

/// Requirements carry their name on the current version.
fn item_name(item: &Item) -> JsonValue {
    match item.body.get("name") {
        Some(name) => name.clone(),
        None => item.body["current_version"]["name"].clone(),
    }
}

fn merge(mut base: JsonValue, extra: JsonValue) -> JsonValue {
    if let (Some(base), JsonValue::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    base
}

impl State {
    fn project_of(&self, parent_type: &str, parent_id: u64) -> u64 {
        if parent_type == "project" {
            return parent_id;
        }
        match self.folders.iter().find(|f| f.id == parent_id) {
            Some(f) => self.project_of(&f.parent_type, f.parent_id),
            None => 0,
        }
    }

    fn tree_node(&self, folder: &Folder) -> JsonValue {
        // Library items are interleaved with folders, as in the real API.
        let mut children: Vec<JsonValue> = self
            .items
            .iter()
            .filter(|i| i.parent_id == folder.id && i.parent_type == folder.type_name)
            .map(|i| json!({ "_type": i.type_name, "id": i.id, "name": item_name(i), "children": [] }))
            .collect();
        children.extend(
            self.folders
                .iter()
                .filter(|f| f.parent_type == folder.type_name && f.parent_id == folder.id)
                .map(|f| self.tree_node(f)),
        );
        json!({
            "_type": folder.type_name,
            "id": folder.id,
            "name": folder.name,
            "url": format!("http://squash/api/rest/latest/{}s/{}", folder.type_name, folder.id),
            "children": children
        })
    }

    fn tree(&self, type_name: &str, project_id: u64) -> JsonValue {
        let roots: Vec<JsonValue> = self
            .folders
            .iter()
            .filter(|f| f.type_name == type_name && f.parent_type == "project" && f.parent_id == project_id)
            .map(|f| self.tree_node(f))
            .collect();
        json!([{ "_type": "project", "id": project_id, "name": format!("P{}", project_id), "folders": roots }])
    }

    fn content(&self, parent_type: &str, parent_id: u64) -> Vec<JsonValue> {
        let mut content: Vec<JsonValue> = self
            .folders
            .iter()
            .filter(|f| f.parent_type == parent_type && f.parent_id == parent_id)
            .map(|f| json!({ "_type": f.type_name, "id": f.id, "name": f.name }))
            .collect();
        content.extend(
            self.items
                .iter()
                .filter(|i| i.parent_type == parent_type && i.parent_id == parent_id)
                .map(|i| json!({ "_type": i.type_name, "id": i.id, "name": item_name(i) })),
        );
        content
    }

    fn page(&self, items: Vec<JsonValue>, key: &str, page: usize, size: usize) -> JsonValue {
        let total_pages = items.len().div_ceil(size);
        let slice: Vec<JsonValue> = items.into_iter().skip(page * size).take(size).collect();
        let mut embedded = Map::new();
        embedded.insert(key.to_string(), JsonValue::Array(slice));
        json!({
            "_embedded": embedded,
            "page": { "size": size, "totalElements": 0, "totalPages": total_pages, "number": page }
        })
    }
}

#[async_trait]
impl RemoteStore for FakeSquash {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<JsonValue> {
        let mut state = self.state.lock().unwrap();
        state.gets.push((
            path.to_string(),
            query.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ));
        let page: usize = query
            .iter()
            .find(|(k, _)| *k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);

        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["projects"] => {
                let projects = state
                    .projects
                    .iter()
                    .map(|(id, name)| json!({ "_type": "project", "id": id, "name": name }))
                    .collect();
                Ok(state.page(projects, "projects", page, self.page_size))
            }
            ["projects", id] => {
                let id: u64 = id.parse().map_err(|_| not_found(path))?;
                let (_, name) = state
                    .projects
                    .iter()
                    .find(|(pid, _)| *pid == id)
                    .ok_or_else(|| not_found(path))?;
                let label = if id % 2 == 1 { format!("label-{}", id) } else { String::new() };
                Ok(json!({ "_type": "project", "id": id, "name": name, "label": label, "description": "" }))
            }
            ["projects", pid, library, "content"] => {
                let pid: u64 = pid.parse().map_err(|_| not_found(path))?;
                let key = match *library {
                    "requirements-library" => "requirement-library-content",
                    "test-cases-library" => "test-case-library-content",
                    _ => return Err(not_found(path)),
                };
                let content = state.content("project", pid);
                Ok(state.page(content, key, page, self.page_size))
            }
            [resource, "tree", pid] => {
                let pid: u64 = pid.parse().map_err(|_| not_found(path))?;
                let type_name = resource.trim_end_matches('s');
                Ok(state.tree(type_name, pid))
            }
            [resource, id, "content"] => {
                let id: u64 = id.parse().map_err(|_| not_found(path))?;
                let type_name = resource.trim_end_matches('s');
                let content = state.content(type_name, id);
                Ok(state.page(content, "content", page, self.page_size))
            }
            [resource, id] if resource.ends_with("-folders") => {
                let id: u64 = id.parse().map_err(|_| not_found(path))?;
                let folder = state.folders.iter().find(|f| f.id == id).ok_or_else(|| not_found(path))?;
                Ok(merge(
                    json!({
                        "_type": folder.type_name,
                        "id": folder.id,
                        "name": folder.name,
                        "description": folder.description.clone().unwrap_or_default(),
                        "parent": { "_type": folder.parent_type, "id": folder.parent_id },
                        "project": { "_type": "project", "id": state.project_of(&folder.parent_type, folder.parent_id) }
                    }),
                    audit(),
                ))
            }
            ["requirements", id] => {
                let id: u64 = id.parse().map_err(|_| not_found(path))?;
                let item = state.items.iter().find(|i| i.id == id).ok_or_else(|| not_found(path))?;
                let version = &item.body["current_version"];
                Ok(json!({
                    "_type": "requirement",
                    "id": id,
                    "name": version["name"],
                    "current_version": merge(
                        json!({
                            "_type": "requirement-version",
                            "reference": version.get("reference").cloned().unwrap_or(json!("")),
                            "description": version["description"],
                        }),
                        audit(),
                    )
                }))
            }
            ["test-cases", id] => {
                let id: u64 = id.parse().map_err(|_| not_found(path))?;
                let item = state.items.iter().find(|i| i.id == id).ok_or_else(|| not_found(path))?;
                Ok(merge(
                    json!({
                        "_type": "test-case",
                        "id": id,
                        "name": item.body["name"],
                        "reference": item.body.get("reference").cloned().unwrap_or(json!("")),
                        "description": item.body["description"],
                        "prerequisite": item.body.get("prerequisite").cloned().unwrap_or(json!("")),
                        "steps": item.body.get("steps").cloned().unwrap_or(json!([])),
                    }),
                    audit(),
                ))
            }
            _ => Err(not_found(path)),
        }
    }

    async fn post(&self, path: &str, body: &JsonValue) -> Result<JsonValue> {
        let mut state = self.state.lock().unwrap();
        if state.fail_post_at == Some(state.posts.len()) {
            return Err(McpError::RemoteRequestFailed {
                status: 412,
                message: "parent does not exist".to_string(),
            });
        }
        state.posts.push((path.to_string(), body.clone()));

        let id = state.next_id;
        state.next_id += 1;
        let parent_type = body["parent"]["_type"].as_str().unwrap_or_default().to_string();
        let parent_id = body["parent"]["id"].as_u64().unwrap_or_default();

        match path {
            "projects" => {
                let name = body["name"].as_str().unwrap_or_default().to_string();
                state.projects.push((id, name));
            }
            p if p.ends_with("-folders") => state.folders.push(Folder {
                id,
                type_name: body["_type"].as_str().unwrap_or_default().to_string(),
                name: body["name"].as_str().unwrap_or_default().to_string(),
                description: body["description"].as_str().map(str::to_string),
                parent_type,
                parent_id,
            }),
            "requirements" | "test-cases" => state.items.push(Item {
                id,
                type_name: body["_type"].as_str().unwrap_or_default().to_string(),
                body: body.clone(),
                parent_type,
                parent_id,
            }),
            _ => return Err(not_found(path)),
        }

        Ok(json!({ "_type": body["_type"], "id": id }))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.state.lock().unwrap().deletes.push(path.to_string());
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn session(fake: &Arc<FakeSquash>) -> McpSession {
    McpSession::new(fake.clone())
}

/// Helper to dispatch a tool call.
async fn call_tool(session: &McpSession, registry: &ToolRegistry, name: &str, args: JsonValue) -> JsonValue {
    let args_map: Map<String, JsonValue> = match args {
        JsonValue::Object(m) => m,
        _ => Map::new(),
    };
    registry
        .dispatch(session, name, args_map)
        .await
        .unwrap_or_else(|e| panic!("Tool {} failed: {}", name, e))
}

/// Helper to dispatch a tool call and expect an error.
async fn call_tool_err(session: &McpSession, registry: &ToolRegistry, name: &str, args: JsonValue) -> McpError {
    let args_map: Map<String, JsonValue> = match args {
        JsonValue::Object(m) => m,
        _ => Map::new(),
    };
    match registry.dispatch(session, name, args_map).await {
        Ok(v) => panic!("Expected tool {} to fail, got {}", name, v),
        Err(e) => e,
    }
}

/// Names of a folder tree, nested the same way.
fn shape(folders: &JsonValue) -> JsonValue {
    JsonValue::Array(
        folders
            .as_array()
            .unwrap()
            .iter()
            .map(|f| json!({ "name": f["name"], "children": shape(&f["children"]) }))
            .collect(),
    )
}

// =============================================================================
// Folder Tools
// =============================================================================

#[tokio::test]
async fn test_nested_creation_scenario() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let result = call_tool(
        &session,
        &registry,
        "create_requirement_folders",
        json!({ "project_id": 7, "name": "A", "children": [{ "name": "B" }] }),
    )
    .await;

    assert_eq!(
        result,
        json!({ "folder": { "name": "A", "id": 100, "children": [{ "name": "B", "id": 101, "children": [] }] } })
    );

    let posts = fake.posts();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].0, "requirement-folders");
    assert_eq!(
        posts[0].1,
        json!({ "_type": "requirement-folder", "name": "A", "parent": { "_type": "project", "id": 7 } })
    );
    assert_eq!(
        posts[1].1,
        json!({ "_type": "requirement-folder", "name": "B", "parent": { "_type": "requirement-folder", "id": 100 } })
    );
}

#[tokio::test]
async fn test_created_tree_round_trips_through_fetch() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let structure = json!({
        "name": "Release 1",
        "description": "<p>first release</p>",
        "children": [
            { "name": "Login", "children": [{ "name": "SSO" }, { "name": "Password" }] },
            { "name": "Billing" },
            { "name": "Reports", "children": [{ "name": "Monthly", "children": [{ "name": "Export" }] }] }
        ]
    });
    let mut args = structure.clone();
    args["project_id"] = json!(3);
    call_tool(&session, &registry, "create_test_case_folders", args).await;

    let result = call_tool(&session, &registry, "get_test_case_folder_tree", json!({ "project_id": 3 })).await;

    let expected = shape(&json!([structure_with_children(&structure)]));
    assert_eq!(shape(&result["folders"]), expected);

    let root = &result["folders"][0];
    assert_eq!(root["description"], "<p>first release</p>");
    assert_eq!(root["created_by"], "admin");
    assert!(root.get("modified_by").is_none());
    assert!(root["children"][1].get("description").is_none());
}

/// Fill in the `children: []` the tree output always carries.
fn structure_with_children(requested: &JsonValue) -> JsonValue {
    let children: Vec<JsonValue> = requested
        .get("children")
        .and_then(|c| c.as_array())
        .map(|c| c.iter().map(structure_with_children).collect())
        .unwrap_or_default();
    json!({ "name": requested["name"], "children": children })
}

#[tokio::test]
async fn test_create_under_existing_folder() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let parent = call_tool(&session, &registry, "create_campaign_folders", json!({ "project_id": 1, "name": "Sprints" })).await;
    let parent_id = parent["folder"]["id"].as_u64().unwrap();

    call_tool(
        &session,
        &registry,
        "create_campaign_folders",
        json!({ "project_id": 1, "parent_folder_id": parent_id, "name": "Sprint 1" }),
    )
    .await;

    assert_eq!(
        fake.posts()[1].1["parent"],
        json!({ "_type": "campaign-folder", "id": parent_id })
    );

    let tree = call_tool(&session, &registry, "get_campaign_folder_tree", json!({ "project_id": 1 })).await;
    assert_eq!(
        shape(&tree["folders"]),
        json!([{ "name": "Sprints", "children": [{ "name": "Sprint 1", "children": [] }] }])
    );
}

#[tokio::test]
async fn test_tree_ignores_other_kinds_and_library_items() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let folder = call_tool(
        &session,
        &registry,
        "create_requirement_folders",
        json!({ "project_id": 2, "name": "Specs", "children": [{ "name": "API" }] }),
    )
    .await;
    call_tool(&session, &registry, "create_test_case_folders", json!({ "project_id": 2, "name": "Suites" })).await;
    call_tool(
        &session,
        &registry,
        "create_requirements",
        json!({
            "project_id": 2,
            "parent_folder_id": folder["folder"]["id"],
            "requirements": [{ "name": "R1", "description": "<p>r</p>" }]
        }),
    )
    .await;

    let tree = call_tool(&session, &registry, "get_requirement_folders_tree", json!({ "project_id": 2 })).await;
    assert_eq!(
        shape(&tree["folders"]),
        json!([{ "name": "Specs", "children": [{ "name": "API", "children": [] }] }])
    );
}

#[tokio::test]
async fn test_empty_project_has_no_folders() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let tree = call_tool(&session, &registry, "get_requirement_folders_tree", json!({ "project_id": 9 })).await;
    assert_eq!(tree, json!({ "folders": [] }));
}

#[tokio::test]
async fn test_partial_creation_keeps_created_folders() {
    let fake = Arc::new(FakeSquash::new());
    fake.fail_post_at(2);
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let err = call_tool_err(
        &session,
        &registry,
        "create_requirement_folders",
        json!({ "project_id": 1, "name": "A", "children": [{ "name": "B" }, { "name": "C" }, { "name": "D" }] }),
    )
    .await;

    assert!(matches!(err, McpError::RemoteRequestFailed { status: 412, .. }));
    assert_eq!(fake.folder_count(), 2);
    assert!(fake.deletes().is_empty());
}

#[tokio::test]
async fn test_delete_folder_messages() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let result = call_tool(&session, &registry, "delete_test_case_folder", json!({ "folder_id": 42 })).await;
    assert_eq!(result, json!({ "message": "Test case folder 42 deleted successfully" }));

    let result = call_tool(&session, &registry, "delete_requirement_folder", json!({ "folder_id": 5 })).await;
    assert_eq!(result, json!({ "message": "Requirement folder 5 deleted successfully" }));

    assert_eq!(fake.deletes(), vec!["test-case-folders/42", "requirement-folders/5"]);
}

#[tokio::test]
async fn test_folder_argument_validation() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let err = call_tool_err(&session, &registry, "create_requirement_folders", json!({ "project_id": 1, "name": "  " })).await;
    assert!(matches!(err, McpError::InvalidArg { .. }));

    let err = call_tool_err(&session, &registry, "create_requirement_folders", json!({ "name": "A" })).await;
    assert!(matches!(err, McpError::MissingArg(ref n) if n == "project_id"));

    let err = call_tool_err(
        &session,
        &registry,
        "create_requirement_folders",
        json!({ "project_id": 1, "name": "A", "children": [{ "title": "B" }] }),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "children"));

    let err = call_tool_err(&session, &registry, "get_campaign_folder_tree", json!({ "project_id": 1, "depth": 2 })).await;
    assert!(matches!(err, McpError::InvalidArg { ref name, .. } if name == "depth"));

    assert!(fake.posts().is_empty());
}

// =============================================================================
// Project Tools
// =============================================================================

#[tokio::test]
async fn test_list_projects_reads_every_page() {
    let fake = Arc::new(FakeSquash::with_projects(&["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]));
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let result = call_tool(&session, &registry, "list_projects", json!({})).await;

    let names: Vec<&str> = result["projects"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta", "Gamma", "Delta", "Epsilon"]);
    assert_eq!(result["projects"][0]["label"], "label-1");
    assert!(result["projects"][1].get("label").is_none());
    assert!(result["projects"][0].get("description").is_none());

    let listing: Vec<Vec<(String, String)>> = fake
        .gets()
        .into_iter()
        .filter(|(path, _)| path == "projects")
        .map(|(_, query)| query)
        .collect();
    assert_eq!(listing.len(), 3);
    for (i, query) in listing.iter().enumerate() {
        assert!(query.contains(&("type".to_string(), "STANDARD".to_string())));
        assert!(query.contains(&("page".to_string(), i.to_string())));
        assert!(query.contains(&("size".to_string(), "50".to_string())));
    }
}

#[tokio::test]
async fn test_create_and_delete_project() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let result = call_tool(&session, &registry, "create_project", json!({ "name": " Apollo ", "label": "APL" })).await;
    assert_eq!(result, json!({ "id": 100 }));
    assert_eq!(
        fake.posts()[0].1,
        json!({ "_type": "project", "name": "Apollo", "label": "APL" })
    );

    let result = call_tool(&session, &registry, "delete_project", json!({ "id": 100 })).await;
    assert_eq!(result, json!({ "message": "Project 100 deleted successfully" }));
    assert_eq!(fake.deletes(), vec!["projects/100"]);
}

// =============================================================================
// Requirement and Test Case Tools
// =============================================================================

#[tokio::test]
async fn test_requirements_round_trip() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let created = call_tool(
        &session,
        &registry,
        "create_requirements",
        json!({
            "project_id": 4,
            "requirements": [
                { "name": "Login", "reference": "REQ-1", "description": "<p>users log in</p>" },
                { "name": "Logout", "description": "<p>users log out</p>" },
                { "name": "Audit", "description": "<p>actions are traced</p>" }
            ]
        }),
    )
    .await;
    assert_eq!(
        created,
        json!({ "requirements": [
            { "id": 100, "name": "Login", "reference": "REQ-1" },
            { "id": 101, "name": "Logout" },
            { "id": 102, "name": "Audit" }
        ] })
    );

    let payload = &fake.posts()[0].1;
    assert_eq!(payload["_type"], "requirement");
    assert_eq!(payload["parent"], json!({ "_type": "project", "id": 4 }));
    assert_eq!(payload["current_version"]["criticality"], "UNDEFINED");
    assert_eq!(payload["current_version"]["category"], json!({ "code": "CAT_UNDEFINED" }));
    assert_eq!(payload["current_version"]["status"], "WORK_IN_PROGRESS");
    assert!(fake.posts()[1].1["current_version"].get("reference").is_none());

    let content = call_tool(&session, &registry, "get_requirement_folder_content", json!({ "project_id": 4 })).await;
    let requirements = content["requirements"].as_array().unwrap();
    assert_eq!(requirements.len(), 3);
    assert_eq!(requirements[0]["reference"], "REQ-1");
    assert_eq!(requirements[0]["description"], "<p>users log in</p>");
    assert!(requirements[1].get("reference").is_none());
    assert!(requirements[2].get("last_modified_on").is_none());

    // 3 items at a page size of 2
    let pages = fake
        .gets()
        .iter()
        .filter(|(path, _)| path == "projects/4/requirements-library/content")
        .count();
    assert_eq!(pages, 2);
}

#[tokio::test]
async fn test_folder_content_only_lists_requirements() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let folder = call_tool(
        &session,
        &registry,
        "create_requirement_folders",
        json!({ "project_id": 1, "name": "Specs", "children": [{ "name": "Nested" }] }),
    )
    .await;
    let folder_id = folder["folder"]["id"].as_u64().unwrap();
    call_tool(
        &session,
        &registry,
        "create_requirements",
        json!({ "project_id": 1, "parent_folder_id": folder_id, "requirements": [{ "name": "R", "description": "d" }] }),
    )
    .await;

    let content = call_tool(
        &session,
        &registry,
        "get_requirement_folder_content",
        json!({ "project_id": 1, "folder_id": folder_id }),
    )
    .await;
    let names: Vec<&str> = content["requirements"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["R"]);
    assert!(fake.gets().iter().any(|(path, _)| path == &format!("requirement-folders/{}/content", folder_id)));
}

#[tokio::test]
async fn test_test_cases_round_trip() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let folder = call_tool(&session, &registry, "create_test_case_folders", json!({ "project_id": 2, "name": "Smoke" })).await;
    let folder_id = folder["folder"]["id"].as_u64().unwrap();

    let created = call_tool(
        &session,
        &registry,
        "create_test_cases",
        json!({
            "project_id": 2,
            "parent_folder_id": folder_id,
            "test_cases": [{
                "name": "Login works",
                "description": "<p>nominal login</p>",
                "prerequisite": "<p>an account</p>",
                "steps": [
                    { "action": "Open the login page", "expected_result": "The form is shown" },
                    { "action": "Submit credentials", "expected_result": "The dashboard is shown" }
                ]
            }]
        }),
    )
    .await;
    assert_eq!(created, json!({ "test_cases": [{ "id": 101, "name": "Login works" }] }));

    let payload = &fake.posts()[1].1;
    assert_eq!(payload["parent"], json!({ "_type": "test-case-folder", "id": folder_id }));
    assert_eq!(payload["steps"][0]["_type"], "action-step");
    assert!(payload.get("reference").is_none());

    let content = call_tool(
        &session,
        &registry,
        "get_test_case_folder_content",
        json!({ "project_id": 2, "folder_id": folder_id }),
    )
    .await;
    let test_case = &content["test_cases"][0];
    assert_eq!(test_case["prerequisite"], "<p>an account</p>");
    assert!(test_case.get("reference").is_none());
    assert_eq!(
        test_case["steps"],
        json!([
            { "action": "Open the login page", "expected_result": "The form is shown" },
            { "action": "Submit credentials", "expected_result": "The dashboard is shown" }
        ])
    );

    let result = call_tool(&session, &registry, "delete_test_case", json!({ "id": 101 })).await;
    assert_eq!(result, json!({ "message": "Test case 101 deleted successfully" }));
}

#[tokio::test]
async fn test_invalid_batch_creates_nothing() {
    let fake = Arc::new(FakeSquash::new());
    let session = session(&fake);
    let registry = ToolRegistry::new();

    let err = call_tool_err(
        &session,
        &registry,
        "create_test_cases",
        json!({
            "project_id": 2,
            "test_cases": [
                { "name": "ok", "description": "d" },
                { "name": "bad", "description": "d", "steps": [{ "action": " ", "expected_result": "x" }] }
            ]
        }),
    )
    .await;
    assert!(matches!(err, McpError::InvalidArg { .. }));

    let err = call_tool_err(&session, &registry, "create_requirements", json!({ "project_id": 2, "requirements": [] })).await;
    assert!(matches!(err, McpError::InvalidArg { .. }));

    assert!(fake.posts().is_empty());
}

// =============================================================================
// Server
// =============================================================================

async fn rpc(server: &mut McpServer, id: u64, name: &str, arguments: JsonValue) -> JsonValue {
    let request: JsonRpcRequest = serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    }))
    .unwrap();
    let response = server.handle_request(request).await.expect("response");
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn test_text_content_equals_structured_content() {
    let fake = Arc::new(FakeSquash::with_projects(&["Alpha", "Beta", "Gamma"]));
    let mut server = McpServer::new(session(&fake));

    let calls = vec![
        ("create_requirement_folders", json!({ "project_id": 1, "name": "Émoji ✓ \"quoted\"", "children": [{ "name": "B" }] })),
        ("get_requirement_folders_tree", json!({ "project_id": 1 })),
        ("list_projects", json!({})),
        ("create_requirements", json!({ "project_id": 1, "requirements": [{ "name": "R", "description": "<p>x</p>" }] })),
        ("get_requirement_folder_content", json!({ "project_id": 1 })),
        ("delete_project", json!({ "id": 3 })),
    ];

    for (i, (name, args)) in calls.into_iter().enumerate() {
        let response = rpc(&mut server, i as u64, name, args).await;
        let result = &response["result"];
        assert!(result.get("isError").is_none(), "{} failed: {}", name, response);

        let text = result["content"][0]["text"].as_str().unwrap();
        let parsed: JsonValue = serde_json::from_str(text).unwrap();
        assert_eq!(parsed, result["structuredContent"], "{}", name);
    }
}

#[tokio::test]
async fn test_remote_failure_is_reported_as_tool_error() {
    let fake = Arc::new(FakeSquash::new());
    fake.fail_post_at(0);
    let mut server = McpServer::new(session(&fake));

    let response = rpc(&mut server, 1, "create_project", json!({ "name": "X" })).await;
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        response["result"]["content"][0]["text"],
        "Request failed:\nstatus=412\nerror=parent does not exist"
    );
}

#[tokio::test]
async fn test_invalid_arguments_are_rpc_errors() {
    let fake = Arc::new(FakeSquash::new());
    let mut server = McpServer::new(session(&fake));

    let response = rpc(&mut server, 1, "delete_project", json!({ "id": "seven" })).await;
    assert_eq!(response["error"]["code"], -32602);

    let response = rpc(&mut server, 2, "drop_database", json!({})).await;
    assert_eq!(response["error"]["code"], -32601);
}

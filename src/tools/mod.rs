//! Tool registry and category definitions.
//!
//! Provides the infrastructure for registering and dispatching MCP tools.

pub mod folders;
pub mod projects;
pub mod requirements;
pub mod test_cases;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};
use crate::session::McpSession;

/// A tool definition for the MCP tools/list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDef {
    /// Tool name (e.g., "list_projects")
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: JsonValue,
    /// JSON Schema of the structured result
    #[serde(rename = "outputSchema", default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<JsonValue>,
}

impl ToolDef {
    /// Create a new tool definition.
    pub fn new(name: &str, description: &str, input_schema: JsonValue) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
            output_schema: None,
        }
    }

    /// Attach the schema of the tool's structured result.
    pub fn with_output(mut self, output_schema: JsonValue) -> Self {
        self.output_schema = Some(output_schema);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Projects,
    Folders,
    Requirements,
    TestCases,
}

/// Registry of all available tools.
pub struct ToolRegistry {
    tools: Vec<ToolDef>,
    routes: HashMap<String, Category>,
}

impl ToolRegistry {
    /// Create a new registry with all tools registered.
    pub fn new() -> Self {
        let mut registry = Self {
            tools: Vec::new(),
            routes: HashMap::new(),
        };

        registry.register(Category::Projects, projects::tools());
        registry.register(Category::Folders, folders::tools());
        registry.register(Category::Requirements, requirements::tools());
        registry.register(Category::TestCases, test_cases::tools());

        registry
    }

    fn register(&mut self, category: Category, tools: Vec<ToolDef>) {
        for tool in tools {
            self.routes.insert(tool.name.clone(), category);
            self.tools.push(tool);
        }
    }

    /// Get all tool definitions.
    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    /// Dispatch a tool call to the appropriate handler.
    ///
    /// Returns the structured result of the tool.
    pub async fn dispatch(
        &self,
        session: &McpSession,
        name: &str,
        args: Map<String, JsonValue>,
    ) -> Result<JsonValue> {
        match self.routes.get(name) {
            Some(Category::Projects) => projects::dispatch(session, name, args).await,
            Some(Category::Folders) => folders::dispatch(session, name, args).await,
            Some(Category::Requirements) => requirements::dispatch(session, name, args).await,
            Some(Category::TestCases) => test_cases::dispatch(session, name, args).await,
            None => Err(McpError::UnknownTool(name.to_string())),
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Attach a `description` to a schema fragment.
pub fn describe(mut schema: JsonValue, description: &str) -> JsonValue {
    if let Some(obj) = schema.as_object_mut() {
        obj.insert("description".to_string(), JsonValue::String(description.to_string()));
    }
    schema
}

/// Schema of an array whose items follow `items`.
pub fn array_of(items: JsonValue) -> JsonValue {
    serde_json::json!({ "type": "array", "items": items })
}

/// Helper macro for creating JSON Schema for tool input and output objects.
///
/// Every property carries a description: `"name": type => "description"`.
/// A type is one of the keywords below or a parenthesized expression
/// evaluating to a schema fragment.
#[macro_export]
macro_rules! schema {
    // Object with required and optional properties
    (object {
        required: { $($req_name:literal : $req_type:tt => $req_desc:expr),* $(,)? },
        optional: { $($opt_name:literal : $opt_type:tt => $opt_desc:expr),* $(,)? }
    }) => {{
        #[allow(unused_mut)]
        let mut required: Vec<&str> = Vec::new();
        $(required.push($req_name);)*

        let mut props = serde_json::Map::new();
        $(props.insert($req_name.to_string(), $crate::tools::describe($crate::schema!(@type $req_type), &$req_desc));)*
        $(props.insert($opt_name.to_string(), $crate::tools::describe($crate::schema!(@type $opt_type), &$opt_desc));)*

        serde_json::json!({
            "type": "object",
            "properties": props,
            "required": required,
            "additionalProperties": false
        })
    }};

    // Object with only required properties
    (object {
        required: { $($req_name:literal : $req_type:tt => $req_desc:expr),* $(,)? }
    }) => {
        $crate::schema!(object {
            required: { $($req_name : $req_type => $req_desc),* },
            optional: {}
        })
    };

    // Object with only optional properties
    (object {
        optional: { $($opt_name:literal : $opt_type:tt => $opt_desc:expr),* $(,)? }
    }) => {
        $crate::schema!(object {
            required: {},
            optional: { $($opt_name : $opt_type => $opt_desc),* }
        })
    };

    // Empty object (no parameters)
    (object {}) => {{
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": [],
            "additionalProperties": false
        })
    }};

    // Type mappings
    (@type string) => { serde_json::json!({"type": "string"}) };
    (@type number) => { serde_json::json!({"type": "number"}) };
    (@type integer) => { serde_json::json!({"type": "integer"}) };
    (@type boolean) => { serde_json::json!({"type": "boolean"}) };
    (@type any) => { serde_json::json!({}) };
    (@type array_integer) => { serde_json::json!({"type": "array", "items": {"type": "integer"}}) };
    (@type array_string) => { serde_json::json!({"type": "array", "items": {"type": "string"}}) };
    (@type ($schema:expr)) => { $schema };
}

/// Schema of the `{ message }` result returned by delete tools.
pub fn message_output(description: &str) -> JsonValue {
    serde_json::json!({
        "type": "object",
        "properties": {
            "message": { "type": "string", "description": description }
        },
        "required": ["message"],
        "additionalProperties": false
    })
}

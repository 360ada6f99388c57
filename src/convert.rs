//! Argument extraction and tool result formatting.
//!
//! Tool arguments arrive as a loose JSON object; these helpers turn them into
//! typed values with MCP-friendly errors. Results are wrapped so that the
//! text content and the structured content always carry the same JSON.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};

use crate::error::{McpError, Result};

/// Reject arguments the tool does not declare.
pub fn check_known_args(args: &Map<String, JsonValue>, known: &[&str]) -> Result<()> {
    match args.keys().find(|k| !known.contains(&k.as_str())) {
        Some(unknown) => Err(McpError::InvalidArg {
            name: unknown.clone(),
            reason: "Unrecognized argument".to_string(),
        }),
        None => Ok(()),
    }
}

/// Helper to get a required u64 argument from JSON arguments.
pub fn get_u64_arg(args: &Map<String, JsonValue>, name: &str) -> Result<u64> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Err(McpError::MissingArg(name.to_string())),
        Some(v) => v.as_u64().ok_or_else(|| McpError::InvalidArg {
            name: name.to_string(),
            reason: "Expected a non-negative integer".to_string(),
        }),
    }
}

/// Helper to get an optional u64 argument from JSON arguments.
pub fn get_optional_u64(args: &Map<String, JsonValue>, name: &str) -> Result<Option<u64>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(_) => get_u64_arg(args, name).map(Some),
    }
}

/// Helper to get a required string argument, trimmed and non-empty.
pub fn get_string_arg(args: &Map<String, JsonValue>, name: &str) -> Result<String> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Err(McpError::MissingArg(name.to_string())),
        Some(v) => {
            let s = v.as_str().ok_or_else(|| McpError::InvalidArg {
                name: name.to_string(),
                reason: "Expected a string".to_string(),
            })?;
            non_empty(name, s)
        }
    }
}

/// Helper to get an optional string argument; when given it must not be blank.
pub fn get_optional_string(args: &Map<String, JsonValue>, name: &str) -> Result<Option<String>> {
    match args.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(_) => get_string_arg(args, name).map(Some),
    }
}

/// Deserialize an argument into a typed value.
pub fn get_typed_arg<T: DeserializeOwned>(args: &Map<String, JsonValue>, name: &str) -> Result<T> {
    let value = args
        .get(name)
        .cloned()
        .ok_or_else(|| McpError::MissingArg(name.to_string()))?;
    serde_json::from_value(value).map_err(|e| McpError::InvalidArg {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Trim a string field and make sure something is left.
pub fn non_empty(name: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(McpError::InvalidArg {
            name: name.to_string(),
            reason: "Must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Trim an optional string field; a given value must not be blank.
pub fn optional_non_empty(name: &str, value: Option<&str>) -> Result<Option<String>> {
    value.map(|v| non_empty(name, v)).transpose()
}

/// Wrap a successful tool output for the `tools/call` response.
///
/// The text content is the pretty-printed rendering of the structured
/// content, so parsing the text yields exactly the structured value.
pub fn tool_result(structured: JsonValue) -> Result<JsonValue> {
    let text = serde_json::to_string_pretty(&structured)?;
    Ok(serde_json::json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": structured,
    }))
}

/// Wrap a failed tool execution for the `tools/call` response.
pub fn tool_error_result(err: &McpError) -> JsonValue {
    serde_json::json!({
        "content": [{ "type": "text", "text": err.to_string() }],
        "isError": true,
    })
}

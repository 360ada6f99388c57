//! Flatten a JSON Schema into parameter table rows.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

/// One row of a parameter table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterRow {
    /// Dotted path, with `[]` marking array items (e.g. `children[].name`).
    pub path: String,
    /// Display type, see [`format_type`].
    pub type_name: String,
    /// Whether the enclosing object lists the property as required.
    pub required: bool,
    /// Property description, `-` when absent.
    pub description: String,
}

/// Display type of a schema fragment.
///
/// A `$ref` is never resolved here and renders as `object (recursive)`.
pub fn format_type(schema: &JsonValue) -> String {
    if schema.get("$ref").is_some() {
        return "object (recursive)".to_string();
    }
    match schema.get("type").and_then(JsonValue::as_str) {
        Some("array") => match schema.get("items") {
            Some(items) => format!("array of {}", format_type(items)),
            None => "array".to_string(),
        },
        Some(other) => other.to_string(),
        None => "any".to_string(),
    }
}

/// Collect the rows of every property reachable from `schema`.
///
/// `root` is the document `$ref` pointers are resolved against. A reference
/// used as array `items` is expanded only if it is not in `visited`, the set
/// of references already expanded on the current branch; a repeated
/// reference is skipped silently, so self-referential schemas terminate.
pub fn collect_parameters(
    schema: &JsonValue,
    root: &JsonValue,
    parent_path: &str,
    visited: &HashSet<String>,
) -> Vec<ParameterRow> {
    let mut rows = Vec::new();

    if schema.get("type").and_then(JsonValue::as_str) != Some("object") {
        return rows;
    }
    let properties = match schema.get("properties").and_then(JsonValue::as_object) {
        Some(properties) => properties,
        None => return rows,
    };
    let required: Vec<&str> = schema
        .get("required")
        .and_then(JsonValue::as_array)
        .map(|r| r.iter().filter_map(JsonValue::as_str).collect())
        .unwrap_or_default();

    for (name, prop) in properties {
        let path = if parent_path.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", parent_path, name)
        };

        rows.push(ParameterRow {
            path: path.clone(),
            type_name: format_type(prop),
            required: required.contains(&name.as_str()),
            description: prop
                .get("description")
                .and_then(JsonValue::as_str)
                .unwrap_or("-")
                .to_string(),
        });

        if prop.get("$ref").is_some() {
            continue;
        }

        match prop.get("type").and_then(JsonValue::as_str) {
            Some("object") => rows.extend(collect_parameters(prop, root, &path, visited)),
            Some("array") => {
                let items = match prop.get("items") {
                    Some(items) => items,
                    None => continue,
                };
                let item_path = format!("{}[]", path);

                match items.get("$ref").and_then(JsonValue::as_str) {
                    Some(reference) if visited.contains(reference) => {}
                    Some(reference) => match resolve_ref(root, reference) {
                        Some(target) => {
                            let mut branch = visited.clone();
                            branch.insert(reference.to_string());
                            rows.extend(collect_parameters(target, root, &item_path, &branch));
                        }
                        None => tracing::debug!(reference, "unresolvable $ref"),
                    },
                    None => rows.extend(collect_parameters(items, root, &item_path, visited)),
                }
            }
            _ => {}
        }
    }

    rows
}

/// Resolve a local `#/a/b` reference as a JSON pointer into `root`.
fn resolve_ref<'a>(root: &'a JsonValue, reference: &str) -> Option<&'a JsonValue> {
    let pointer = reference.strip_prefix('#')?;
    root.pointer(pointer)
}

//! Markdown rendering of a tool catalog.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use super::params::collect_parameters;
use crate::tools::ToolDef;

/// Render the documentation of `tools`.
///
/// The document has a table of contents followed by one section per tool:
/// description, input schema and parameter table, and the same for the
/// output schema when the tool declares one.
pub fn generate_markdown(tools: &[ToolDef]) -> String {
    let mut markdown = String::from("# MCP Server Tools\n\n");
    markdown.push_str("This document lists all available tools in the MCP server.\n\n");
    markdown.push_str(&format!("**Total Tools:** {}\n\n", tools.len()));

    markdown.push_str("## Table of Contents\n\n");
    for tool in tools {
        let short = if tool.description.is_empty() {
            String::new()
        } else {
            format!(" - {}", tool.description)
        };
        markdown.push_str(&format!("- [{}](#{}){}\n", tool.name, tool.name, short));
    }
    markdown.push_str("\n---\n\n");

    for tool in tools {
        markdown.push_str(&format!("## {}\n\n", tool.name));
        if !tool.description.is_empty() {
            markdown.push_str(&format!("{}\n\n", tool.description));
        }

        schema_section(&mut markdown, "Input", &tool.input_schema);
        if let Some(output) = &tool.output_schema {
            schema_section(&mut markdown, "Output", output);
        }

        markdown.push_str("---\n\n");
    }

    markdown
}

fn schema_section(markdown: &mut String, title: &str, schema: &JsonValue) {
    markdown.push_str(&format!("### {} Schema\n\n", title));
    markdown.push_str("```json\n");
    markdown.push_str(&serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string()));
    markdown.push_str("\n```\n\n");

    if schema.get("properties").is_none() {
        return;
    }

    markdown.push_str(&format!("### {} Parameters\n\n", title));
    markdown.push_str("| Parameter | Type | Required | Description |\n");
    markdown.push_str("|-----------|------|----------|-------------|\n");
    for row in collect_parameters(schema, schema, "", &HashSet::new()) {
        markdown.push_str(&format!(
            "| `{}` | `{}` | {} | {} |\n",
            row.path,
            row.type_name,
            if row.required { "Yes" } else { "No" },
            row.description
        ));
    }
    markdown.push('\n');
}

use crate::cli::{Cli, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, OutputData};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use ofocus_core::{OmniFocusTools, Tool};
use owo_colors::OwoColorize;
use serde_json::Value;

/// Truncate text to fit within a given width, adding "..." if truncated
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else if max_chars > 3 {
        let head: String = text.chars().take(max_chars - 3).collect();
        format!("{}...", head)
    } else {
        text.chars().take(max_chars).collect()
    }
}

pub fn run(cli: &Cli, tool: Option<&str>) -> Result<()> {
    let tools = OmniFocusTools::definitions();

    let selected: Vec<Tool> = match tool {
        Some(name) => {
            let found = tools
                .into_iter()
                .find(|t| t.name == name)
                .ok_or_else(|| CommandError::ToolNotFound(name.to_string()))?;
            vec![found]
        }
        None => tools,
    };

    match cli.output {
        OutputFormat::Pretty if tool.is_some() => {
            print_tool_detail(&selected[0]);
        }
        OutputFormat::Pretty => {
            print_tool_table(&selected);
        }
        _ => {
            let data = OutputData::ToolsList(serde_json::to_value(&selected)?);
            format_output(&data, &cli.output)?;
        }
    }
    Ok(())
}

fn print_tool_table(tools: &[Tool]) {
    println!();
    println!("{}", "Available Tools".bold().cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tool", "Description"]);

    for t in tools {
        let description = t.description.as_deref().unwrap_or("");
        table.add_row(vec![t.name.to_string(), truncate_text(description, 90)]);
    }
    println!("{table}");
    println!();
    println!(
        "{} {}",
        "Details:".dimmed(),
        "ofocus tools <name>".cyan()
    );
}

fn print_tool_detail(tool: &Tool) {
    println!();
    println!("{}", tool.name.bold().cyan());
    if let Some(description) = &tool.description {
        println!("{}", description);
    }
    println!();

    let required: Vec<&str> = tool
        .input_schema
        .get("required")
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let Some(properties) = tool.input_schema.get("properties").and_then(|v| v.as_object())
    else {
        println!("{}", "No parameters.".dimmed());
        return;
    };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Parameter", "Type", "Required", "Description"]);

    for (name, schema) in properties {
        let kind = describe_type(schema);
        let description = schema
            .get("description")
            .and_then(|v| v.as_str())
            .unwrap_or("");
        let is_required = if required.contains(&name.as_str()) {
            "yes"
        } else {
            ""
        };
        table.add_row(vec![
            name.clone(),
            kind,
            is_required.to_string(),
            truncate_text(description, 70),
        ]);
    }
    println!("{table}");
}

fn describe_type(schema: &Value) -> String {
    if let Some(values) = schema.get("enum").and_then(|v| v.as_array()) {
        return values
            .iter()
            .filter_map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
    }
    match schema.get("type") {
        Some(Value::String(t)) if t == "array" => {
            let item = schema
                .get("items")
                .map(describe_type)
                .unwrap_or_else(|| "any".to_string());
            format!("{}[]", item)
        }
        Some(Value::String(t)) => t.clone(),
        _ => "any".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_text_is_char_safe() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("ééééééééé", 6), "ééé...");
    }

    #[test]
    fn test_describe_type() {
        assert_eq!(describe_type(&json!({"type": "string"})), "string");
        assert_eq!(
            describe_type(&json!({"type": "array", "items": {"type": "string"}})),
            "string[]"
        );
        assert_eq!(
            describe_type(&json!({"type": "string", "enum": ["add", "remove", "replace"]})),
            "add | remove | replace"
        );
    }
}

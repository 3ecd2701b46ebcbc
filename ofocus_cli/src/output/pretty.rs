//! Pretty formatter for terminal output.
//!
//! Lists of tasks, projects, folders and tags render as tables; single objects
//! render as indented key/value blocks.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, ContentArrangement, Table};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

/// Keys that hold the main list in a tool payload, with the columns to show.
const LIST_COLUMNS: &[(&str, &[&str])] = &[
    (
        "tasks",
        &["name", "projectName", "dueDate", "flagged", "tags", "id"],
    ),
    (
        "projects",
        &["name", "status", "folderName", "nextReviewDate", "taskCount", "id"],
    ),
    ("folders", &["name", "status", "projectCount", "folderCount", "id"]),
    ("tags", &["name", "status", "taskCount", "parentTagName", "id"]),
    ("succeeded", &["name", "status", "nextReviewDate", "id"]),
    ("failed", &["id", "message"]),
];

/// Maximum characters per table cell
const MAX_CELL: usize = 48;

/// Format a tool payload for the terminal.
pub fn format_pretty(value: &Value) -> String {
    let mut output = String::new();
    match value {
        Value::Object(obj) => format_object(obj, &mut output),
        other => output.push_str(&format_scalar(other)),
    }
    output
}

/// Uncoloured `key: value` lines, one list item per block.
pub fn format_plain(value: &Value) -> String {
    let mut output = String::new();
    write_plain(value, &mut output, 0);
    output
}

fn format_object(obj: &Map<String, Value>, output: &mut String) {
    let lists: Vec<(&str, &Vec<Value>, &[&str])> = LIST_COLUMNS
        .iter()
        .filter_map(|(key, columns)| match obj.get(*key) {
            Some(Value::Array(items)) => Some((*key, items, *columns)),
            _ => None,
        })
        .collect();

    if lists.is_empty() {
        format_hierarchical(obj, output, 0);
        return;
    }

    // Scalars first (count, query, message), then each list.
    for (key, value) in obj {
        if !value.is_array() && !value.is_object() {
            output.push_str(&format!("{}: {}\n", key.dimmed(), format_scalar(value)));
        }
    }
    if let Some(Value::Object(summary)) = obj.get("summary") {
        let parts: Vec<String> = summary
            .iter()
            .map(|(k, v)| format!("{} {}", format_scalar(v).bold(), k))
            .collect();
        output.push_str(&format!("{}\n", parts.join(", ")));
    }

    for (key, items, columns) in lists {
        output.push('\n');
        output.push_str(&format!("{} ({})\n", key.cyan().bold(), items.len()));
        if !items.is_empty() {
            output.push_str(&format_table(items, columns));
            output.push('\n');
        }
    }
}

fn format_table(items: &[Value], columns: &[&str]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns.iter().map(Cell::new).collect::<Vec<_>>());

    for item in items {
        let row: Vec<String> = columns
            .iter()
            .map(|c| truncate(&cell_text(item.get(*c)), MAX_CELL))
            .collect();
        table.add_row(row);
    }
    table.to_string()
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(true)) => "✓".to_string(),
        Some(Value::Bool(false)) => String::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(format_scalar)
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => format_scalar(other),
    }
}

fn format_hierarchical(obj: &Map<String, Value>, output: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);
    for (key, value) in obj {
        match value {
            Value::Object(nested) => {
                output.push_str(&format!("{}{}:\n", indent, key.cyan().bold()));
                format_hierarchical(nested, output, depth + 1);
            }
            Value::Array(items) if items.iter().any(|v| v.is_object()) => {
                output.push_str(&format!(
                    "{}{} ({} items):\n",
                    indent,
                    key.cyan().bold(),
                    items.len()
                ));
                for item in items {
                    if let Value::Object(nested) = item {
                        format_hierarchical(nested, output, depth + 1);
                        output.push('\n');
                    }
                }
            }
            other => {
                let formatted_key = if key == "name" {
                    key.bold().to_string()
                } else {
                    key.dimmed().to_string()
                };
                output.push_str(&format!(
                    "{}{}: {}\n",
                    indent,
                    formatted_key,
                    cell_text(Some(other))
                ));
            }
        }
    }
}

fn write_plain(value: &Value, output: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        Value::Object(obj) => {
            for (key, v) in obj {
                match v {
                    Value::Object(_) | Value::Array(_) => {
                        output.push_str(&format!("{}{}:\n", indent, key));
                        write_plain(v, output, depth + 1);
                    }
                    _ => output.push_str(&format!("{}{}: {}\n", indent, key, format_scalar(v))),
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                write_plain(item, output, depth);
                if item.is_object() {
                    output.push('\n');
                }
            }
        }
        other => output.push_str(&format!("{}{}\n", indent, format_scalar(other))),
    }
}

fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= max_chars {
        single_line
    } else {
        let head: String = single_line.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

use crate::cli::{Cli, OutputFormat};
use crate::commands::{load_tools, CommandError, Result};
use crate::output::{format_output, format_pretty, OutputData};
use ofocus_core::{CallToolRequestParam, JsonObject, OmniFocusError, Tool};
use owo_colors::OwoColorize;
use serde_json::{json, Map, Value};

pub async fn run(cli: &Cli, tool: &str, args_json: Option<&str>, params: &[String]) -> Result<()> {
    let tools = load_tools()?;
    let definitions = tools.list_tools();
    let tool_def = definitions
        .iter()
        .find(|t| t.name == tool)
        .ok_or_else(|| CommandError::ToolNotFound(tool.to_string()))?;

    let arguments = build_arguments(tool_def, args_json, params)?;
    tracing::debug!(tool, args = arguments.len(), "calling tool");

    let request = CallToolRequestParam {
        name: tool.to_string().into(),
        arguments: Some(arguments),
    };
    let result = tools.call_tool(request).await.map_err(|e| match e {
        OmniFocusError::ToolNotFound(name) => CommandError::ToolNotFound(name),
        other => other.into(),
    })?;

    if result.is_error == Some(true) {
        let message = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_else(|| "tool failed".to_string());
        return Err(CommandError::ToolError(message));
    }

    let payload = result
        .structured_content
        .unwrap_or_else(|| json!({ "ok": true }));

    match cli.output {
        OutputFormat::Pretty => {
            println!("{} {}", "Call".bold().cyan(), tool.cyan());
            println!();
            println!("{}", format_pretty(&payload));
        }
        _ => {
            let data = OutputData::CallResult {
                tool: tool.to_string(),
                result: payload,
            };
            format_output(&data, &cli.output)?;
        }
    }

    Ok(())
}

/// Merge `--args` JSON with `--key value` pairs, typing each value by the
/// tool's input schema.
pub fn build_arguments(
    tool: &Tool,
    args_json: Option<&str>,
    params: &[String],
) -> Result<JsonObject> {
    let mut args_map: Map<String, Value> = Map::new();

    if let Some(s) = args_json {
        if !s.trim().is_empty() {
            match serde_json::from_str::<Value>(s)? {
                Value::Object(m) => args_map = m,
                _ => {
                    return Err(CommandError::InvalidArgs(
                        "--args must be a JSON object".to_string(),
                    ))
                }
            }
        }
    }

    let properties = tool
        .input_schema
        .get("properties")
        .and_then(|v| v.as_object())
        .cloned()
        .unwrap_or_default();

    let mut i = 0;
    while i < params.len() {
        let param = &params[i];
        let Some(flag) = param.strip_prefix("--") else {
            return Err(CommandError::InvalidArgs(format!(
                "unexpected argument '{}'; use --key value",
                param
            )));
        };

        let (raw_name, value) = match flag.split_once('=') {
            Some((name, value)) => (name, Some(value.to_string())),
            None if i + 1 < params.len() && !params[i + 1].starts_with("--") => {
                i += 1;
                (flag, Some(params[i].clone()))
            }
            None => (flag, None),
        };
        i += 1;

        let name = camel_case(raw_name);
        let schema = properties.get(&name).ok_or_else(|| {
            CommandError::InvalidArgs(format!(
                "{} has no parameter '{}' (known: {})",
                tool.name,
                name,
                properties.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })?;

        let typed = match value {
            Some(value) => typed_value(schema, &value),
            // A bare flag is a boolean switch.
            None => Value::Bool(true),
        };
        args_map.insert(name, typed);
    }

    Ok(args_map)
}

/// `due-date` and `due_date` both become `dueDate`.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' || c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type") {
        Some(Value::String(t)) => Some(t.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(|t| t.as_str())
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn typed_value(schema: &Value, raw: &str) -> Value {
    match schema_type(schema) {
        Some("boolean") => raw.parse::<bool>().map(Value::Bool).unwrap_or_else(|_| json!(raw)),
        Some("integer") => raw.parse::<i64>().map(|n| json!(n)).unwrap_or_else(|_| json!(raw)),
        Some("number") => raw.parse::<f64>().map(|n| json!(n)).unwrap_or_else(|_| json!(raw)),
        Some("array") => {
            if raw.trim_start().starts_with('[') {
                serde_json::from_str(raw).unwrap_or_else(|_| json!(raw))
            } else {
                Value::Array(
                    raw.split(',')
                        .map(|s| s.trim())
                        .filter(|s| !s.is_empty())
                        .map(|s| json!(s))
                        .collect(),
                )
            }
        }
        _ => json!(raw),
    }
}

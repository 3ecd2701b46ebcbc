use crate::cli::OutputFormat;
use crate::commands::doctor::Check;
use crate::commands::Result;
use serde::Serialize;
use serde_json::Value;

mod pretty;
pub use pretty::format_pretty;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    ToolsList(Value),
    CallResult { tool: String, result: Value },
    ConfigInfo(Value),
    Doctor(Vec<Check>),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text => {
            format_text_output(data)?;
        }
        OutputFormat::Pretty => {
            format_pretty_output(data)?;
        }
    }
    Ok(())
}

fn format_text_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::ToolsList(tools) => {
            for tool in tools.as_array().into_iter().flatten() {
                println!(
                    "{}\t{}",
                    tool["name"].as_str().unwrap_or_default(),
                    tool["description"].as_str().unwrap_or_default()
                );
            }
        }
        OutputData::CallResult { result, .. } => {
            print!("{}", pretty::format_plain(result));
        }
        OutputData::ConfigInfo(config) => {
            println!("Configuration:");
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputData::Doctor(checks) => {
            for check in checks {
                let status = if check.passed { "ok" } else { "FAIL" };
                println!("{}\t{}\t{}", status, check.name, check.detail);
            }
        }
    }
    Ok(())
}

fn format_pretty_output(data: &OutputData) -> Result<()> {
    match data {
        OutputData::CallResult { result, .. } => println!("{}", format_pretty(result)),
        OutputData::ToolsList(value) | OutputData::ConfigInfo(value) => {
            println!("{}", format_pretty(value))
        }
        OutputData::Doctor(_) => format_text_output(data)?,
    }
    Ok(())
}

use crate::cli::{Cli, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, OutputData};
use ofocus_core::config::Config;
use ofocus_core::{OmniFocus, OmniFocusError};
use owo_colors::OwoColorize;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl Check {
    fn pass(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            detail: detail.into(),
        }
    }

    fn fail(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            detail: detail.into(),
        }
    }
}

pub async fn run(cli: &Cli) -> Result<()> {
    let checks = collect_checks().await;
    let failed = checks.iter().filter(|c| !c.passed).count();

    match cli.output {
        OutputFormat::Pretty => {
            println!();
            println!("{}", "ofocus doctor".bold().cyan());
            println!();
            for check in &checks {
                let mark = if check.passed {
                    "✓".green().to_string()
                } else {
                    "✗".red().to_string()
                };
                println!("  {} {:<12} {}", mark, check.name.bold(), check.detail);
            }
            println!();
        }
        _ => format_output(&OutputData::Doctor(checks.clone()), &cli.output)?,
    }

    if failed > 0 {
        return Err(CommandError::ToolError(format!(
            "{} of {} checks failed",
            failed,
            checks.len()
        )));
    }
    Ok(())
}

async fn collect_checks() -> Vec<Check> {
    let mut checks = Vec::new();

    let config = match Config::load_default() {
        Ok(config) => {
            checks.push(Check::pass(
                "config",
                Config::default_path().display().to_string(),
            ));
            config
        }
        Err(e) => {
            checks.push(Check::fail("config", e.to_string()));
            return checks;
        }
    };

    let osascript = &config.executor.osascript_path;
    if osascript.is_file() {
        checks.push(Check::pass("osascript", osascript.display().to_string()));
    } else {
        checks.push(Check::fail(
            "osascript",
            format!("{} not found (macOS only)", osascript.display()),
        ));
        return checks;
    }

    let client = OmniFocus::from_config(&config.executor);
    match client.probe().await {
        Ok(info) => {
            checks.push(Check::pass("omnifocus", format!("version {}", info.version)));
            checks.push(Check::pass("permission", "automation allowed"));
            checks.push(Check::pass(
                "document",
                format!(
                    "{} inbox tasks, {} projects, {} tags",
                    info.inbox_tasks, info.projects, info.tags
                ),
            ));
        }
        Err(OmniFocusError::PermissionDenied) => {
            checks.push(Check::pass("omnifocus", "running"));
            checks.push(Check::fail(
                "permission",
                OmniFocusError::PermissionDenied.to_string(),
            ));
        }
        Err(e) => checks.push(Check::fail("omnifocus", e.to_string())),
    }

    checks
}

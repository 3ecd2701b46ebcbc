use crate::cli::{Cli, ConfigAction, OutputFormat};
use crate::commands::{CommandError, Result};
use crate::output::{format_output, OutputData};
use ofocus_core::config::{Config, CONFIG_ENV};
use owo_colors::OwoColorize;
use std::fs;
use std::path::Path;

pub fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli),
        ConfigAction::Path => {
            println!("{}", Config::default_path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init_config(&Config::default_path(), force),
    }
}

fn show_config(cli: &Cli) -> Result<()> {
    let path = Config::default_path();
    let config = Config::load_default()?;

    match cli.output {
        OutputFormat::Pretty | OutputFormat::Text => {
            println!();
            println!("{}", "Configuration".bold().cyan());
            println!("{}", "=============".cyan());
            println!();
            let source = if path.exists() {
                path.display().to_string()
            } else {
                format!("{} (not found, using defaults)", path.display())
            };
            println!("{} {}", "Config file:".dimmed(), source);
            if std::env::var_os(CONFIG_ENV).is_some() {
                println!("{} set by {}", "Path:".dimmed(), CONFIG_ENV.yellow());
            }
            println!();
            println!("{}", config.to_toml_string()?);
        }
        _ => {
            let data = OutputData::ConfigInfo(serde_json::to_value(&config)?);
            format_output(&data, &cli.output)?;
        }
    }
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CommandError::ConfigExists(path.display().to_string()));
    }
    write_default_config(path)?;
    println!(
        "{} {}",
        "Wrote default config to".green(),
        path.display().to_string().cyan()
    );
    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, Config::default().to_toml_string()?)?;
    Ok(())
}

use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "ofocus_cli=warn,ofocus_core=warn",
        1 => "ofocus_cli=info,ofocus_core=info",
        _ => "ofocus_cli=debug,ofocus_core=debug",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        None => show_overview(),
        Some(Commands::Tools { tool }) => tools::run(&cli, tool.as_deref()),
        Some(Commands::Call { tool, args, params }) => {
            call::run(&cli, tool, args.as_deref(), params).await
        }
        Some(Commands::Config { action }) => config::run(&cli, action.clone()),
        Some(Commands::Doctor) => doctor::run(&cli).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}

fn show_overview() -> commands::Result<()> {
    println!();
    println!(
        "{}  {}",
        "ofocus".bold().cyan(),
        "- OmniFocus from the terminal".dimmed()
    );
    println!();
    println!(
        "  {} tools available",
        ofocus_core::tools::TOOL_NAMES.len().to_string().green().bold()
    );
    println!();

    println!("{}", "Quick Start:".bold().cyan());
    println!(
        "  {}{}",
        "ofocus tools".cyan(),
        "                      Show all tools".dimmed()
    );
    println!(
        "  {}{}",
        "ofocus call list_tasks".cyan(),
        "            Run a tool".dimmed()
    );
    println!(
        "  {}{}",
        "ofocus doctor".cyan(),
        "                     Check the OmniFocus connection".dimmed()
    );
    println!();

    println!(
        "{} Use {} for full help",
        "Tip:".dimmed(),
        "ofocus --help".cyan()
    );
    println!();

    Ok(())
}

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "ofocus")]
#[command(about = "ofocus - OmniFocus tools from the terminal")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  ofocus tools                                  List every tool and what it does
  ofocus call list_tasks --flagged true         Flagged tasks
  ofocus call create_task --name \"Call Sam\"     New inbox task
  ofocus doctor                                 Check osascript, OmniFocus and permissions

\x1b[1;36mConfiguration:\x1b[0m
  ofocus config path                            Where the config file lives
  ofocus config init                            Write a default config file
  ofocus config show                            Effective configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the available tools
    ///
    /// The same tools the MCP server exposes, with their parameters.
    #[command(alias = "ls")]
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  ofocus tools                  Table of tools
  ofocus tools create_task      Parameters of one tool
  ofocus tools --output json    Full definitions with input schemas")]
    Tools {
        /// Show only this tool
        tool: Option<String>,
    },

    /// Call a tool directly
    ///
    /// Arguments come from --args as a JSON object, from --key value pairs, or
    /// both (pairs win). Keys may be camelCase or kebab-case.
    #[command(after_help = "\x1b[1;33mExamples:\x1b[0m
  ofocus call get_task --name \"Call dentist\"
  ofocus call update_task --id kXq3 --due-date 2026-11-01
  ofocus call tag_task --args '{\"taskId\": \"kXq3\", \"tags\": [\"work\"], \"mode\": \"add\"}'
  ofocus call mark_projects_reviewed --project-ids p1,p2,p3")]
    Call {
        /// Tool name (e.g., list_tasks, create_project)
        tool: String,
        /// JSON arguments (e.g., '{"query": "invoice"}')
        #[arg(long)]
        args: Option<String>,
        /// --key value pairs
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        params: Vec<String>,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check that OmniFocus can be scripted from this machine
    Doctor,
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration (file plus environment overrides)
    Show,
    /// Print the config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
}

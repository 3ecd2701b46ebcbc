pub mod call;
pub mod config;
pub mod doctor;
pub mod tools;

use ofocus_core::config::{Config, ConfigError};
use ofocus_core::OmniFocusTools;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Tool '{0}' not found. Run `ofocus tools` to see what is available")]
    ToolNotFound(String),

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    ToolError(String),

    #[error("Config file already exists at {0} (use --force to overwrite)")]
    ConfigExists(String),

    #[error("Core library error: {0}")]
    Core(#[from] ofocus_core::OmniFocusError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Tools wired to the real `osascript`, configured the same way as the server.
pub fn load_tools() -> Result<OmniFocusTools> {
    let config = Config::load_default()?;
    Ok(ofocus_core::build_tools(&config))
}

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "OFOCUS_CONFIG";
pub const OSASCRIPT_ENV: &str = "OFOCUS_OSASCRIPT";
pub const TIMEOUT_ENV: &str = "OFOCUS_TIMEOUT_SECS";

pub const DEFAULT_OSASCRIPT: &str = "/usr/bin/osascript";
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("toml serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub executor: ExecutorConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub osascript_path: PathBuf,
    pub max_output_bytes: usize,
    /// Zero disables the timeout.
    pub timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            osascript_path: PathBuf::from(DEFAULT_OSASCRIPT),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            timeout_secs: 0,
            temp_dir: None,
        }
    }
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "ofocus".to_string(),
            instructions: Some(
                "Tools for reading and changing OmniFocus tasks, projects, folders and tags. \
                 Objects can be addressed by id or by name; ambiguous names return the \
                 matching ids so the call can be retried by id."
                    .to_string(),
            ),
        }
    }
}

impl Config {
    /// `$OFOCUS_CONFIG`, else `<config dir>/ofocus/config.toml`.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ofocus")
            .join("config.toml")
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load the config file if one exists, then apply environment overrides.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        let mut cfg = if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::load_from_path(&path)?
        } else {
            Self::default()
        };
        cfg.apply_env(|var| std::env::var(var).ok())?;
        Ok(cfg)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(OSASCRIPT_ENV).filter(|s| !s.trim().is_empty()) {
            self.executor.osascript_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            self.executor.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::Env {
                var: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }
}

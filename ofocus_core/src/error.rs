use serde_json::json;

use crate::lookup::Candidate;
use crate::sanitize::SanitizeError;

pub const APP_NOT_RUNNING_MESSAGE: &str =
    "OmniFocus is not running. Please launch the application first and try again.";

pub const PERMISSION_DENIED_MESSAGE: &str = "Automation permission denied. Grant automation permission for OmniFocus in System Settings > Privacy & Security > Automation, then try again.";

#[derive(Debug, thiserror::Error)]
pub enum OmniFocusError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Invalid input: {0}")]
    Sanitization(#[from] SanitizeError),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Ambiguous {
        message: String,
        matches: Vec<Candidate>,
    },

    #[error("{}", APP_NOT_RUNNING_MESSAGE)]
    AppNotRunning,

    #[error("{}", PERMISSION_DENIED_MESSAGE)]
    PermissionDenied,

    #[error("Script execution failed: {0}")]
    Host(String),

    #[error("OmniFocus script error: {0}")]
    Script(String),

    #[error("Script output exceeded the {0} byte limit")]
    OutputTooLarge(usize),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("OmniFocus returned a response that was not valid JSON: {raw}")]
    InvalidJson { raw: String },

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Method not found")]
    MethodNotFound,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl OmniFocusError {
    pub fn code_str(&self) -> &'static str {
        match self {
            OmniFocusError::InvalidParams(_) => "invalid_params",
            OmniFocusError::Sanitization(_) => "invalid_input",
            OmniFocusError::NotFound(_) => "not_found",
            OmniFocusError::Ambiguous { .. } => "ambiguous",
            OmniFocusError::AppNotRunning => "app_not_running",
            OmniFocusError::PermissionDenied => "permission_denied",
            OmniFocusError::Host(_) => "host_error",
            OmniFocusError::Script(_) => "script_error",
            OmniFocusError::OutputTooLarge(_) => "output_too_large",
            OmniFocusError::Timeout(_) => "timeout",
            OmniFocusError::InvalidJson { .. } => "parse_error",
            OmniFocusError::ToolNotFound(_) => "tool_not_found",
            OmniFocusError::MethodNotFound => "method_not_found",
            OmniFocusError::Config(_) => "config_error",
            _ => "internal_error",
        }
    }

    pub fn to_jsonrpc_error(&self) -> serde_json::Value {
        let (code, message) = match self {
            OmniFocusError::ToolNotFound(name) => (-32602, format!("Tool not found: {}", name)),
            OmniFocusError::InvalidParams(msg) => (-32602, msg.to_string()),
            OmniFocusError::Sanitization(err) => (-32602, err.to_string()),
            OmniFocusError::MethodNotFound => (-32601, "Method not found".to_string()),
            err => (-32603, err.to_string()),
        };

        json!({
            "code": code,
            "message": message,
        })
    }
}

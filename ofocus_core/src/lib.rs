// src/lib.rs
pub mod config;
pub mod error;
pub mod executor;
pub mod lookup;
pub mod mcp_server;
pub mod model;
pub mod omnifocus;
pub mod params;
pub mod sanitize;
pub mod script;
pub mod tools;
pub mod transport;
pub mod utils;

// Re-export types from rmcp that users of this library might need
pub use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, InitializeRequestParam,
    InitializeResult, JsonObject, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
    RawContent, ServerCapabilities, TextContent, Tool,
};

pub use crate::config::Config;
pub use crate::error::OmniFocusError;
pub use crate::executor::{OsascriptRunner, ScriptRunner};
pub use crate::omnifocus::OmniFocus;
pub use crate::tools::OmniFocusTools;

use crate::mcp_server::{JsonRpcHandler, McpServer};
use crate::transport::StdioTransport;

/// Build the tool set from a loaded config.
pub fn build_tools(config: &Config) -> OmniFocusTools {
    OmniFocusTools::new(OmniFocus::from_config(&config.executor))
}

/// Serve MCP over stdio until stdin closes.
pub async fn serve_stdio(config: Config) -> std::io::Result<()> {
    let tools = build_tools(&config);
    let handler = JsonRpcHandler::new(McpServer::new(tools, config.server));
    StdioTransport::new(handler).run().await
}

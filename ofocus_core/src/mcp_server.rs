use serde_json::{json, Value};
use tracing::{debug, info};

use crate::config::ServerConfig;
use crate::error::OmniFocusError;
use crate::tools::OmniFocusTools;
use rmcp::model::*;

/// MCP server over the OmniFocus tool set.
pub struct McpServer {
    tools: OmniFocusTools,
    config: ServerConfig,
}

impl McpServer {
    pub fn new(tools: OmniFocusTools, config: ServerConfig) -> Self {
        Self { tools, config }
    }

    pub fn get_capabilities(&self) -> ServerCapabilities {
        ServerCapabilities {
            tools: Some(ToolsCapability {
                list_changed: Some(false),
            }),
            ..Default::default()
        }
    }

    /// Handle initialize request
    pub async fn handle_initialize(
        &self,
        request: InitializeRequestParam,
    ) -> Result<InitializeResult, OmniFocusError> {
        info!(
            client = %request.client_info.name,
            client_version = %request.client_info.version,
            "MCP Server initializing"
        );

        Ok(InitializeResult {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: self.get_capabilities(),
            server_info: Implementation {
                name: self.config.name.clone(),
                title: Some("OmniFocus".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: self.config.instructions.clone(),
        })
    }

    pub async fn handle_list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListToolsResult, OmniFocusError> {
        Ok(ListToolsResult {
            tools: self.tools.list_tools(),
            next_cursor: None,
        })
    }

    pub async fn handle_call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, OmniFocusError> {
        self.tools.call_tool(request).await
    }

    /// No resources are exposed; clients that probe still get a valid answer.
    pub async fn handle_list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListResourcesResult, OmniFocusError> {
        Ok(ListResourcesResult {
            resources: Vec::new(),
            next_cursor: None,
        })
    }

    pub async fn handle_list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
    ) -> Result<ListPromptsResult, OmniFocusError> {
        Ok(ListPromptsResult {
            prompts: Vec::new(),
            next_cursor: None,
        })
    }
}

/// JSON-RPC message handler for the MCP server
pub struct JsonRpcHandler {
    server: McpServer,
}

impl JsonRpcHandler {
    pub fn new(server: McpServer) -> Self {
        Self { server }
    }

    /// Process one JSON-RPC message. Notifications (no `id`) get no response.
    pub async fn handle_request(&self, request: Value) -> Option<Value> {
        let method = request
            .get("method")
            .and_then(|m| m.as_str())
            .unwrap_or("")
            .to_string();
        debug!(method = %method, "handling JSON-RPC message");

        let Some(id) = request.get("id").cloned() else {
            debug!(method = %method, "notification received");
            return None;
        };
        let params = request.get("params").cloned().unwrap_or(json!({}));

        let result = match method.as_str() {
            "ping" => Ok(json!({})),
            "initialize" => match serde_json::from_value::<InitializeRequestParam>(params) {
                Ok(req) => to_result(self.server.handle_initialize(req).await),
                Err(e) => Err(invalid_request(e)),
            },
            "tools/list" => match serde_json::from_value::<Option<PaginatedRequestParam>>(params) {
                Ok(req) => to_result(self.server.handle_list_tools(req).await),
                Err(e) => Err(invalid_request(e)),
            },
            "tools/call" => match serde_json::from_value::<CallToolRequestParam>(params) {
                Ok(req) => to_result(self.server.handle_call_tool(req).await),
                Err(e) => Err(invalid_request(e)),
            },
            "resources/list" => {
                match serde_json::from_value::<Option<PaginatedRequestParam>>(params) {
                    Ok(req) => to_result(self.server.handle_list_resources(req).await),
                    Err(e) => Err(invalid_request(e)),
                }
            }
            "prompts/list" => match serde_json::from_value::<Option<PaginatedRequestParam>>(params) {
                Ok(req) => to_result(self.server.handle_list_prompts(req).await),
                Err(e) => Err(invalid_request(e)),
            },
            _ => Err(OmniFocusError::MethodNotFound.to_jsonrpc_error()),
        };

        Some(match result {
            Ok(result) => json!({
                "jsonrpc": "2.0",
                "result": result,
                "id": id,
            }),
            Err(error) => json!({
                "jsonrpc": "2.0",
                "error": error,
                "id": id,
            }),
        })
    }
}

fn to_result<T: serde::Serialize>(result: Result<T, OmniFocusError>) -> Result<Value, Value> {
    result
        .and_then(|r| serde_json::to_value(r).map_err(OmniFocusError::SerdeJson))
        .map_err(|e| e.to_jsonrpc_error())
}

fn invalid_request(e: serde_json::Error) -> Value {
    OmniFocusError::InvalidParams(format!("Invalid request params: {}", e)).to_jsonrpc_error()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ScriptRunner;
    use crate::omnifocus::OmniFocus;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Fixed(&'static str);

    #[async_trait]
    impl ScriptRunner for Fixed {
        async fn run(&self, _script: &str) -> Result<String, OmniFocusError> {
            Ok(self.0.to_string())
        }
    }

    fn handler(output: &'static str) -> JsonRpcHandler {
        let tools = OmniFocusTools::new(OmniFocus::new(Arc::new(Fixed(output))));
        JsonRpcHandler::new(McpServer::new(tools, ServerConfig::default()))
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let h = handler("{}");
        let out = h
            .handle_request(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn test_ping_and_unknown_method() {
        let h = handler("{}");
        let pong = h
            .handle_request(json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}))
            .await
            .unwrap();
        assert_eq!(pong["result"], json!({}));

        let err = h
            .handle_request(json!({"jsonrpc": "2.0", "id": 2, "method": "sampling/createMessage"}))
            .await
            .unwrap();
        assert_eq!(err["error"]["code"], -32601);
        assert_eq!(err["id"], 2);
    }

    #[tokio::test]
    async fn test_tools_list_reports_every_tool() {
        let h = handler("{}");
        let resp = h
            .handle_request(json!({"jsonrpc": "2.0", "id": "a", "method": "tools/list"}))
            .await
            .unwrap();
        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), crate::tools::TOOL_NAMES.len());
        assert!(tools.iter().any(|t| t["name"] == "mark_projects_reviewed"));
    }

    #[tokio::test]
    async fn test_tools_call_success_and_in_band_error() {
        let h = handler(r#"{"ok":true,"data":[{"id":"f1","name":"Work","status":"active"}]}"#);
        let resp = h
            .handle_request(json!({
                "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                "params": {"name": "list_folders", "arguments": {}}
            }))
            .await
            .unwrap();
        assert_eq!(resp["result"]["isError"], false);
        assert_eq!(resp["result"]["structuredContent"]["folders"][0]["name"], "Work");

        let h = handler(r#"{"ok":false,"error":{"kind":"not_found","message":"Task not found: x"}}"#);
        let resp = h
            .handle_request(json!({
                "jsonrpc": "2.0", "id": 4, "method": "tools/call",
                "params": {"name": "get_task", "arguments": {"id": "x"}}
            }))
            .await
            .unwrap();
        assert_eq!(resp["result"]["isError"], true);
        assert_eq!(resp["result"]["content"][0]["text"], "Task not found: x");
    }

    #[tokio::test]
    async fn test_initialize_uses_configured_name() {
        let h = handler("{}");
        let resp = h
            .handle_request(json!({
                "jsonrpc": "2.0", "id": 0, "method": "initialize",
                "params": {
                    "protocolVersion": "2025-06-18",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0"}
                }
            }))
            .await
            .unwrap();
        assert_eq!(resp["result"]["serverInfo"]["name"], "ofocus");
        assert!(resp["result"]["capabilities"]["tools"].is_object());
    }
}

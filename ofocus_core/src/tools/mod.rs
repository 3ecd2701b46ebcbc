//! The tool surface: definitions for `tools/list` and the `tools/call` router.

mod organize;
mod projects;
mod review;
mod tasks;

use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject, Tool};
use serde_json::Value;
use std::borrow::Cow;
use std::future::Future;
use tracing::{debug, info, warn};

use crate::error::OmniFocusError;
use crate::omnifocus::OmniFocus;
use crate::params::{input_schema, parse_params, ToolParams};
use crate::utils::{error_result, structured_result_with_text};

/// Every tool the server exposes, in the order `tools/list` reports them.
pub const TOOL_NAMES: &[&str] = &[
    "list_tasks",
    "get_task",
    "search_tasks",
    "create_task",
    "update_task",
    "complete_task",
    "drop_task",
    "delete_task",
    "tag_task",
    "list_projects",
    "get_project",
    "create_project",
    "update_project",
    "list_folders",
    "create_folder",
    "list_tags",
    "create_tag",
    "get_projects_for_review",
    "mark_projects_reviewed",
    "set_review_interval",
];

pub(crate) fn tool<P: ToolParams>(
    name: &'static str,
    title: &str,
    description: &'static str,
) -> Tool {
    Tool {
        name: Cow::Borrowed(name),
        title: Some(title.to_string()),
        description: Some(Cow::Borrowed(description)),
        input_schema: input_schema::<P>(),
        output_schema: None,
        annotations: None,
        icons: None,
    }
}

#[derive(Clone)]
pub struct OmniFocusTools {
    client: OmniFocus,
}

impl OmniFocusTools {
    pub fn new(client: OmniFocus) -> Self {
        Self { client }
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        Self::definitions()
    }

    /// Tool definitions; building them needs no connection to OmniFocus.
    pub fn definitions() -> Vec<Tool> {
        let mut tools = tasks::tools();
        tools.extend(projects::tools());
        tools.extend(organize::tools());
        tools.extend(review::tools());
        tools
    }

    /// Route a call. Only an unknown tool name is an `Err`; every other failure
    /// comes back as an `isError` result.
    pub async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, OmniFocusError> {
        let name = request.name.to_string();
        let args = request.arguments;
        info!(tool = %name, "tool call");

        let outcome = match name.as_str() {
            "list_tasks" => self.run(&name, args, tasks::list_tasks).await,
            "get_task" => self.run(&name, args, tasks::get_task).await,
            "search_tasks" => self.run(&name, args, tasks::search_tasks).await,
            "create_task" => self.run(&name, args, tasks::create_task).await,
            "update_task" => self.run(&name, args, tasks::update_task).await,
            "complete_task" => self.run(&name, args, tasks::complete_task).await,
            "drop_task" => self.run(&name, args, tasks::drop_task).await,
            "delete_task" => self.run(&name, args, tasks::delete_task).await,
            "tag_task" => self.run(&name, args, tasks::tag_task).await,
            "list_projects" => self.run(&name, args, projects::list_projects).await,
            "get_project" => self.run(&name, args, projects::get_project).await,
            "create_project" => self.run(&name, args, projects::create_project).await,
            "update_project" => self.run(&name, args, projects::update_project).await,
            "list_folders" => self.run(&name, args, organize::list_folders).await,
            "create_folder" => self.run(&name, args, organize::create_folder).await,
            "list_tags" => self.run(&name, args, organize::list_tags).await,
            "create_tag" => self.run(&name, args, organize::create_tag).await,
            "get_projects_for_review" => {
                self.run(&name, args, review::get_projects_for_review).await
            }
            "mark_projects_reviewed" => {
                self.run(&name, args, review::mark_projects_reviewed).await
            }
            "set_review_interval" => self.run(&name, args, review::set_review_interval).await,
            _ => return Err(OmniFocusError::ToolNotFound(name)),
        };

        match outcome {
            Ok(value) => structured_result_with_text(&value).or_else(|e| Ok(error_result(&e))),
            Err(err) => {
                warn!(tool = %name, code = err.code_str(), "tool failed: {}", err);
                Ok(error_result(&err))
            }
        }
    }

    async fn run<P, F, Fut>(
        &self,
        name: &str,
        args: Option<JsonObject>,
        handler: F,
    ) -> Result<Value, OmniFocusError>
    where
        P: ToolParams,
        F: FnOnce(OmniFocus, P) -> Fut,
        Fut: Future<Output = Result<Value, OmniFocusError>>,
    {
        let params = parse_params::<P>(name, args)?;
        debug!(tool = name, "arguments validated");
        handler(self.client.clone(), params).await
    }
}

/// `{ <key>: [...], count }`
pub(crate) fn list_payload<T: serde::Serialize>(
    key: &str,
    items: Vec<T>,
) -> Result<Value, OmniFocusError> {
    let count = items.len();
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), serde_json::to_value(items)?);
    map.insert("count".to_string(), Value::from(count));
    Ok(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::ScriptRunner;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NeverRunner;

    #[async_trait]
    impl ScriptRunner for NeverRunner {
        async fn run(&self, _script: &str) -> Result<String, OmniFocusError> {
            panic!("no script should run");
        }
    }

    fn tools() -> OmniFocusTools {
        OmniFocusTools::new(OmniFocus::new(Arc::new(NeverRunner)))
    }

    #[test]
    fn test_every_tool_is_listed_once() {
        let listed: Vec<String> = tools().list_tools().iter().map(|t| t.name.to_string()).collect();
        assert_eq!(listed, TOOL_NAMES.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        for t in tools().list_tools() {
            assert!(t.description.is_some(), "{} lacks a description", t.name);
            assert_eq!(t.input_schema.get("type"), Some(&Value::from("object")));
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_is_an_error() {
        let err = tools()
            .call_tool(CallToolRequestParam {
                name: "launch_rockets".into(),
                arguments: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, OmniFocusError::ToolNotFound(_)));
        assert_eq!(err.to_jsonrpc_error()["code"], -32602);
    }

    #[tokio::test]
    async fn test_invalid_arguments_are_in_band() {
        let result = tools()
            .call_tool(CallToolRequestParam {
                name: "get_task".into(),
                arguments: Some(JsonObject::new()),
            })
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }
}

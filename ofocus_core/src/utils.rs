use rmcp::model::{CallToolResult, Content};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::OmniFocusError;

/// Keys that hold the main list in a tool payload.
const RESULT_LIST_KEYS: &[&str] = &["tasks", "projects", "folders", "tags", "matches"];

const QUERY_FIELD_KEYS: &[&str] = &["query", "projectName", "tagName", "folderName"];

fn build_no_results_message(key: &str, query_hint: Option<String>) -> String {
    match query_hint {
        Some(query) => format!("No {} found for \"{}\".", key, query),
        None => format!("No {} found.", key),
    }
}

/// Adds `message` and `noResults` when the payload's result list is empty.
fn maybe_attach_no_results_message(map: &mut JsonMap<String, JsonValue>) -> Option<String> {
    let key = RESULT_LIST_KEYS.iter().find(|key| {
        matches!(map.get(**key), Some(JsonValue::Array(items)) if items.is_empty())
    })?;

    let query_hint = map
        .iter()
        .find_map(|(k, v)| {
            if QUERY_FIELD_KEYS.contains(&k.as_str()) {
                v.as_str().map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .filter(|s| !s.is_empty());

    let message = build_no_results_message(key, query_hint);
    map.entry("message".to_string())
        .or_insert(JsonValue::String(message.clone()));
    map.entry("noResults".to_string())
        .or_insert(JsonValue::Bool(true));
    Some(message)
}

/// Success payload: pretty JSON as text content plus the same object as
/// `structuredContent`.
pub fn structured_result_with_text<T: Serialize>(
    data: &T,
) -> Result<CallToolResult, OmniFocusError> {
    let value = serde_json::to_value(data)?;

    // Non-object payloads are wrapped under `data`.
    let mut map: JsonMap<String, JsonValue> = match value {
        JsonValue::Object(m) => m,
        other => {
            let mut m = JsonMap::new();
            m.insert("data".to_string(), other);
            m
        }
    };

    maybe_attach_no_results_message(&mut map);

    let structured = JsonValue::Object(map);
    let text = serde_json::to_string_pretty(&structured)?;
    Ok(CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    })
}

/// In-band failure: the message text with `isError: true`.
pub fn error_result(err: &OmniFocusError) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(err.to_string())],
        structured_content: None,
        is_error: Some(true),
        meta: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_structured_result_carries_text_and_object() {
        let result = structured_result_with_text(&json!({"tasks": [{"id": "t1"}], "count": 1})).unwrap();
        assert_eq!(result.is_error, Some(false));
        let structured = result.structured_content.clone().unwrap();
        assert_eq!(structured["count"], 1);
        assert!(structured.get("noResults").is_none());
        let parsed: JsonValue = serde_json::from_str(&text_of(&result)).unwrap();
        assert_eq!(parsed, structured);
    }

    #[test]
    fn test_empty_list_gets_message_with_query() {
        let result =
            structured_result_with_text(&json!({"query": "milk", "tasks": [], "count": 0})).unwrap();
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["message"], "No tasks found for \"milk\".");
        assert_eq!(structured["noResults"], true);
    }

    #[test]
    fn test_scalar_payload_is_wrapped() {
        let result = structured_result_with_text(&7).unwrap();
        assert_eq!(result.structured_content.unwrap()["data"], 7);
    }

    #[test]
    fn test_error_result() {
        let result = error_result(&OmniFocusError::AppNotRunning);
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("launch the application first"));
    }
}

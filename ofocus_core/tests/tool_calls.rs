use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use ofocus_core::script::ScriptDate;
use ofocus_core::{CallToolRequestParam, CallToolResult, OmniFocus, OmniFocusError, OmniFocusTools};
use ofocus_core::{JsonObject, ScriptRunner};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned `osascript` output and records every script it was given.
#[derive(Default)]
struct MockRunner {
    replies: Mutex<VecDeque<Result<String, OmniFocusError>>>,
    scripts: Mutex<Vec<String>>,
}

impl MockRunner {
    fn with(replies: Vec<Result<String, OmniFocusError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            scripts: Mutex::new(Vec::new()),
        })
    }

    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptRunner for MockRunner {
    async fn run(&self, script: &str) -> Result<String, OmniFocusError> {
        self.scripts.lock().unwrap().push(script.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OmniFocusError::Internal("no reply queued".into())))
    }
}

fn ok(data: Value) -> Result<String, OmniFocusError> {
    Ok(json!({ "ok": true, "data": data }).to_string())
}

fn fail(kind: &str, message: &str) -> Result<String, OmniFocusError> {
    Ok(json!({ "ok": false, "error": { "kind": kind, "message": message } }).to_string())
}

fn project(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "status": "active",
        "lastReviewDate": "2026-10-16T09:00:00.000Z",
        "nextReviewDate": "2026-10-23T09:00:00.000Z",
        "reviewInterval": { "steps": 1, "unit": "week" }
    })
}

async fn call(runner: &Arc<MockRunner>, name: &str, args: Value) -> CallToolResult {
    let tools = OmniFocusTools::new(OmniFocus::new(runner.clone()));
    let arguments: JsonObject = serde_json::from_value(args).unwrap();
    tools
        .call_tool(CallToolRequestParam {
            name: name.to_string().into(),
            arguments: Some(arguments),
        })
        .await
        .unwrap()
}

fn text(result: &CallToolResult) -> String {
    result.content[0]
        .as_text()
        .map(|t| t.text.clone())
        .unwrap_or_default()
}

fn structured(result: &CallToolResult) -> Value {
    result.structured_content.clone().unwrap_or(Value::Null)
}

#[tokio::test]
async fn test_batch_review_reports_partial_failures() {
    let runner = MockRunner::with(vec![
        ok(project("p1", "Garden")),
        fail("not_found", "Project not found: p2"),
        ok(project("p3", "Taxes")),
    ]);
    let result = call(
        &runner,
        "mark_projects_reviewed",
        json!({ "projectIds": ["p1", "p2", "p3"] }),
    )
    .await;

    assert_eq!(result.is_error, Some(false));
    let body = structured(&result);
    assert_eq!(body["summary"], json!({ "total": 3, "succeeded": 2, "failed": 1 }));
    assert_eq!(body["succeeded"][0]["id"], "p1");
    assert_eq!(body["succeeded"][1]["id"], "p3");
    assert_eq!(body["failed"][0]["id"], "p2");
    assert_eq!(body["failed"][0]["message"], "Project not found: p2");
    assert_eq!(runner.scripts().len(), 3);
}

#[tokio::test]
async fn test_batch_review_all_failing_is_still_a_result() {
    let runner = MockRunner::with(vec![
        Err(OmniFocusError::AppNotRunning),
        Err(OmniFocusError::AppNotRunning),
    ]);
    let result = call(
        &runner,
        "mark_projects_reviewed",
        json!({ "projectIds": ["a", "b"] }),
    )
    .await;

    assert_eq!(result.is_error, Some(false));
    let body = structured(&result);
    assert_eq!(body["summary"]["total"], 2);
    assert_eq!(body["summary"]["failed"], 2);
    assert_eq!(body["succeeded"], json!([]));
    assert!(body["failed"][1]["message"]
        .as_str()
        .unwrap()
        .contains("not running"));
}

#[tokio::test]
async fn test_batch_review_skips_forbidden_ids_without_running_them() {
    let runner = MockRunner::with(vec![ok(project("p1", "Garden"))]);
    let result = call(
        &runner,
        "mark_projects_reviewed",
        json!({ "projectIds": ["eval(1)", "p1"] }),
    )
    .await;

    let body = structured(&result);
    assert_eq!(body["summary"], json!({ "total": 2, "succeeded": 1, "failed": 1 }));
    assert_eq!(body["failed"][0]["id"], "eval(1)");
    assert_eq!(runner.scripts().len(), 1);
}

#[tokio::test]
async fn test_empty_batch_is_rejected_before_any_script() {
    let runner = MockRunner::with(vec![]);
    let result = call(&runner, "mark_projects_reviewed", json!({ "projectIds": [] })).await;

    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).contains("projectIds"));
    assert!(runner.scripts().is_empty());
}

#[tokio::test]
async fn test_forbidden_input_never_reaches_osascript() {
    let runner = MockRunner::with(vec![]);
    for (tool, args) in [
        ("create_task", json!({ "name": "Buy ${milk}" })),
        ("search_tasks", json!({ "query": "require('fs')" })),
        ("create_project", json!({ "name": "x", "note": "app.doShellScript('ls')" })),
        ("get_project", json!({ "name": "a.__proto__" })),
    ] {
        let result = call(&runner, tool, args).await;
        assert_eq!(result.is_error, Some(true), "{} accepted forbidden input", tool);
        assert!(text(&result).starts_with("Invalid input"), "{}", text(&result));
    }
    assert!(runner.scripts().is_empty());
}

#[tokio::test]
async fn test_bad_date_fails_before_lookup() {
    let runner = MockRunner::with(vec![]);
    let result = call(
        &runner,
        "create_task",
        json!({ "name": "Call Sam", "projectName": "Errands", "dueDate": "next tuesday" }),
    )
    .await;
    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).contains("dueDate"));
    assert!(runner.scripts().is_empty());
}

#[tokio::test]
async fn test_ambiguous_name_lists_candidates() {
    let runner = MockRunner::with(vec![ok(json!([
        { "id": "t1", "name": "Call dentist", "context": "Inbox" },
        { "id": "t2", "name": "Call dentist again", "context": "Health" }
    ]))]);
    let result = call(&runner, "complete_task", json!({ "name": "call dent" })).await;

    assert_eq!(result.is_error, Some(true));
    let message = text(&result);
    assert!(message.starts_with("Ambiguous task name"), "{}", message);
    assert!(message.contains("(id: t1, in: Inbox)"));
    assert!(message.contains("(id: t2, in: Health)"));
    // Lookup only; the completion script never ran.
    assert_eq!(runner.scripts().len(), 1);
}

#[tokio::test]
async fn test_exact_name_wins_and_resolved_id_is_used() {
    let runner = MockRunner::with(vec![
        ok(json!([
            { "id": "t1", "name": "Call dentist", "context": "Inbox" },
            { "id": "t2", "name": "Call dentist again", "context": "Health" }
        ])),
        ok(json!({ "id": "t1", "name": "Call dentist", "completed": true })),
    ]);
    let result = call(&runner, "complete_task", json!({ "name": "Call Dentist" })).await;

    assert_eq!(result.is_error, Some(false), "{}", text(&result));
    assert_eq!(structured(&result)["task"]["id"], "t1");
    assert_eq!(structured(&result)["completed"], true);
    let scripts = runner.scripts();
    assert_eq!(scripts.len(), 2);
    assert!(scripts[1].contains("\"t1\""));
    assert!(scripts[1].contains("markComplete"));
}

#[tokio::test]
async fn test_unknown_name_is_not_found() {
    let runner = MockRunner::with(vec![ok(json!([]))]);
    let result = call(&runner, "get_project", json!({ "name": "Nonexistent" })).await;
    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).contains("Nonexistent"));
}

#[tokio::test]
async fn test_empty_list_reads_as_no_results() {
    let runner = MockRunner::with(vec![ok(json!([]))]);
    let result = call(&runner, "search_tasks", json!({ "query": "quarterly" })).await;

    assert_eq!(result.is_error, Some(false));
    assert_eq!(structured(&result)["count"], 0);
    assert!(text(&result).contains("quarterly"));
}

#[tokio::test]
async fn test_update_with_set_and_clear_is_rejected() {
    let runner = MockRunner::with(vec![]);
    let result = call(
        &runner,
        "update_task",
        json!({ "id": "t1", "dueDate": "2026-11-01", "clearDueDate": true }),
    )
    .await;
    assert_eq!(result.is_error, Some(true));
    assert!(runner.scripts().is_empty());
}

#[tokio::test]
async fn test_unknown_argument_is_rejected() {
    let runner = MockRunner::with(vec![]);
    let result = call(&runner, "list_tags", json!({ "colour": "red" })).await;
    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).contains("Invalid arguments for tool list_tags"));
}

#[tokio::test]
async fn test_tag_task_sends_sanitized_tags() {
    let runner = MockRunner::with(vec![ok(json!({
        "id": "t9",
        "name": "Draft memo",
        "tags": ["work", "quote\"d"]
    }))]);
    let result = call(
        &runner,
        "tag_task",
        json!({ "taskId": "t9", "tags": ["work", "quote\"d"], "mode": "add" }),
    )
    .await;

    assert_eq!(result.is_error, Some(false), "{}", text(&result));
    assert_eq!(structured(&result)["mode"], "add");
    let script = &runner.scripts()[0];
    assert!(script.contains(r#""quote\"d""#));
}

#[tokio::test]
async fn test_non_json_output_is_an_error_result() {
    let runner = MockRunner::with(vec![Ok("garbage".to_string())]);
    let result = call(&runner, "get_task", json!({ "id": "t1" })).await;

    assert_eq!(result.is_error, Some(true));
    let message = text(&result);
    assert!(message.contains("not valid JSON"), "{}", message);
    assert!(message.contains("garbage"), "{}", message);
}

#[tokio::test]
async fn test_app_not_running_is_an_error_result() {
    for (tool, args) in [
        ("get_task", json!({ "id": "t1" })),
        ("list_tasks", json!({})),
    ] {
        let runner = MockRunner::with(vec![Err(OmniFocusError::AppNotRunning)]);
        let result = call(&runner, tool, args).await;

        assert_eq!(result.is_error, Some(true), "{}", tool);
        assert!(
            text(&result).contains("launch the application first"),
            "{}: {}",
            tool,
            text(&result)
        );
    }
}

#[tokio::test]
async fn test_date_only_due_before_includes_the_whole_day() {
    let runner = MockRunner::with(vec![ok(json!([]))]);
    let result = call(&runner, "list_tasks", json!({ "dueBefore": "2026-10-16" })).await;
    assert_eq!(result.is_error, Some(false), "{}", text(&result));

    let cutoff = ScriptDate::parse_end_of_day("dueBefore", "2026-10-16").unwrap();
    let script = &runner.scripts()[0];
    assert!(script.contains(&format!("dueB > {}", cutoff.literal())));
    // 17:00 that day is inside the window.
    let five_pm = NaiveDate::from_ymd_opt(2026, 10, 16)
        .and_then(|d| d.and_hms_opt(17, 0, 0))
        .and_then(|n| Local.from_local_datetime(&n).earliest())
        .unwrap();
    let end = DateTime::parse_from_rfc3339(cutoff.as_str()).unwrap();
    assert!(five_pm < end);
}

#[tokio::test]
async fn test_blank_id_falls_back_to_name() {
    let runner = MockRunner::with(vec![
        ok(json!([{ "id": "t7", "name": "Milk", "context": "Inbox" }])),
        ok(json!({ "id": "t7", "name": "Milk" })),
    ]);
    let result = call(&runner, "get_task", json!({ "id": "", "name": "Milk" })).await;

    assert_eq!(result.is_error, Some(false), "{}", text(&result));
    assert_eq!(structured(&result)["task"]["id"], "t7");
    let scripts = runner.scripts();
    assert_eq!(scripts.len(), 2);
    assert!(scripts[1].contains("\"t7\""));
}

#[tokio::test]
async fn test_subtask_with_project_is_rejected_before_lookup() {
    let runner = MockRunner::with(vec![]);
    let result = call(
        &runner,
        "create_task",
        json!({ "name": "Prune roses", "parentTaskId": "t1", "projectName": "Garden" }),
    )
    .await;

    assert_eq!(result.is_error, Some(true));
    assert!(text(&result).contains("parentTaskId"));
    assert!(runner.scripts().is_empty());
}

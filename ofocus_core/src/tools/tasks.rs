use rmcp::model::Tool;
use serde_json::{json, Value};

use super::{list_payload, tool};
use crate::error::OmniFocusError;
use crate::lookup::EntityKind;
use crate::model::{Deleted, Task};
use crate::omnifocus::OmniFocus;
use crate::params::{
    CreateTaskParams, ListTasksParams, SearchTasksParams, TagTaskParams, TargetParams,
    UpdateTaskParams,
};
use crate::sanitize::SafeText;
use crate::script::tasks::{self as script, DateChange, NewTask, TaskChanges, TaskQuery};
use crate::script::ScriptDate;

pub(super) fn tools() -> Vec<Tool> {
    vec![
        tool::<ListTasksParams>(
            "list_tasks",
            "List Tasks",
            "List tasks, optionally filtered by project (id or name), tag, flag, inbox, availability and due-date window. Completed and dropped tasks are excluded unless requested.",
        ),
        tool::<TargetParams>(
            "get_task",
            "Get Task",
            "Get one task by id, or by name (case-insensitive; an exact match wins, otherwise the name must match exactly one task).",
        ),
        tool::<SearchTasksParams>(
            "search_tasks",
            "Search Tasks",
            "Search task names and notes for a case-insensitive substring.",
        ),
        tool::<CreateTaskParams>(
            "create_task",
            "Create Task",
            "Create a task in the inbox, in a project, or as a subtask. Dates accept YYYY-MM-DD or RFC 3339. Tags that do not exist are created.",
        ),
        tool::<UpdateTaskParams>(
            "update_task",
            "Update Task",
            "Change a task's name, note, dates, flag, estimate, or move it to another project. Use clearDueDate/clearDeferDate/clearPlannedDate to remove dates.",
        ),
        tool::<TargetParams>("complete_task", "Complete Task", "Mark a task complete."),
        tool::<TargetParams>("drop_task", "Drop Task", "Mark a task dropped."),
        tool::<TargetParams>(
            "delete_task",
            "Delete Task",
            "Permanently delete a task and its subtasks.",
        ),
        tool::<TagTaskParams>(
            "tag_task",
            "Tag Task",
            "Add, remove or replace the tags on a task. Missing tags are created when adding or replacing.",
        ),
    ]
}

pub(super) async fn list_tasks(of: OmniFocus, p: ListTasksParams) -> Result<Value, OmniFocusError> {
    let due_before = ScriptDate::parse_end_of_day_opt("dueBefore", p.due_before.as_deref())?;
    let due_after = ScriptDate::parse_opt("dueAfter", p.due_after.as_deref())?;
    let tag_name = p.tag_name.as_deref().map(SafeText::short).transpose()?;
    let project_id = of
        .optional_id(
            EntityKind::Project,
            p.project_id.as_deref(),
            p.project_name.as_deref(),
        )
        .await?;

    let tasks: Vec<Task> = of
        .eval(script::list_tasks(&TaskQuery {
            project_id,
            tag_name,
            flagged: p.flagged,
            inbox_only: p.inbox_only,
            available_only: p.available_only,
            include_completed: p.include_completed,
            include_dropped: p.include_dropped,
            due_before,
            due_after,
            limit: p.limit,
        }))
        .await?;
    list_payload("tasks", tasks)
}

pub(super) async fn get_task(of: OmniFocus, p: TargetParams) -> Result<Value, OmniFocusError> {
    let id = of
        .target_id(EntityKind::Task, p.id.as_deref(), p.name.as_deref(), true)
        .await?;
    let task: Task = of.eval(script::get_task(&id)).await?;
    Ok(json!({ "task": task }))
}

pub(super) async fn search_tasks(
    of: OmniFocus,
    p: SearchTasksParams,
) -> Result<Value, OmniFocusError> {
    let query = SafeText::short(&p.query)?;
    let tasks: Vec<Task> = of
        .eval(script::search_tasks(&query, p.include_completed, p.limit))
        .await?;
    let mut payload = list_payload("tasks", tasks)?;
    payload["query"] = Value::from(p.query);
    Ok(payload)
}

pub(super) async fn create_task(of: OmniFocus, p: CreateTaskParams) -> Result<Value, OmniFocusError> {
    let name = SafeText::short(&p.name)?;
    let note = p.note.as_deref().map(SafeText::note).transpose()?;
    let tags = SafeText::list(p.tags.as_deref().unwrap_or_default())?;
    let parent_task_id = p.parent_task_id.as_deref().map(SafeText::short).transpose()?;
    let due_date = ScriptDate::parse_opt("dueDate", p.due_date.as_deref())?;
    let defer_date = ScriptDate::parse_opt("deferDate", p.defer_date.as_deref())?;
    let planned_date = ScriptDate::parse_opt("plannedDate", p.planned_date.as_deref())?;
    let project_id = of
        .optional_id(
            EntityKind::Project,
            p.project_id.as_deref(),
            p.project_name.as_deref(),
        )
        .await?;

    let task: Task = of
        .eval(script::create_task(&NewTask {
            name,
            note,
            project_id,
            parent_task_id,
            tags,
            due_date,
            defer_date,
            planned_date,
            flagged: p.flagged,
            estimated_minutes: p.estimated_minutes,
        }))
        .await?;
    Ok(json!({ "task": task, "created": true }))
}

fn date_change(field: &str, value: Option<&str>, clear: bool) -> Result<DateChange, OmniFocusError> {
    if clear {
        return Ok(DateChange::Clear);
    }
    Ok(match ScriptDate::parse_opt(field, value)? {
        Some(date) => DateChange::Set(date),
        None => DateChange::Keep,
    })
}

pub(super) async fn update_task(of: OmniFocus, p: UpdateTaskParams) -> Result<Value, OmniFocusError> {
    let changes = TaskChanges {
        new_name: p.new_name.as_deref().map(SafeText::short).transpose()?,
        note: p.note.as_deref().map(SafeText::note).transpose()?,
        due_date: date_change("dueDate", p.due_date.as_deref(), p.clear_due_date)?,
        defer_date: date_change("deferDate", p.defer_date.as_deref(), p.clear_defer_date)?,
        planned_date: date_change(
            "plannedDate",
            p.planned_date.as_deref(),
            p.clear_planned_date,
        )?,
        flagged: p.flagged,
        estimated_minutes: p.estimated_minutes,
        project_id: None,
    };
    let id = of
        .target_id(EntityKind::Task, p.id.as_deref(), p.name.as_deref(), false)
        .await?;
    let project_id = of
        .optional_id(
            EntityKind::Project,
            p.project_id.as_deref(),
            p.project_name.as_deref(),
        )
        .await?;

    let task: Task = of
        .eval(script::update_task(
            &id,
            &TaskChanges {
                project_id,
                ..changes
            },
        ))
        .await?;
    Ok(json!({ "task": task, "updated": true }))
}

pub(super) async fn complete_task(of: OmniFocus, p: TargetParams) -> Result<Value, OmniFocusError> {
    let id = of
        .target_id(EntityKind::Task, p.id.as_deref(), p.name.as_deref(), false)
        .await?;
    let task: Task = of.eval(script::complete_task(&id)).await?;
    Ok(json!({ "task": task, "completed": true }))
}

pub(super) async fn drop_task(of: OmniFocus, p: TargetParams) -> Result<Value, OmniFocusError> {
    let id = of
        .target_id(EntityKind::Task, p.id.as_deref(), p.name.as_deref(), false)
        .await?;
    let task: Task = of.eval(script::drop_task(&id)).await?;
    Ok(json!({ "task": task, "dropped": true }))
}

pub(super) async fn delete_task(of: OmniFocus, p: TargetParams) -> Result<Value, OmniFocusError> {
    let id = of
        .target_id(EntityKind::Task, p.id.as_deref(), p.name.as_deref(), true)
        .await?;
    let deleted: Deleted = of.eval(script::delete_task(&id)).await?;
    Ok(serde_json::to_value(deleted)?)
}

pub(super) async fn tag_task(of: OmniFocus, p: TagTaskParams) -> Result<Value, OmniFocusError> {
    let tags = SafeText::list(p.tags.as_slice())?;
    let id = of
        .target_id(
            EntityKind::Task,
            p.task_id.as_deref(),
            p.task_name.as_deref(),
            false,
        )
        .await?;
    let task: Task = of.eval(script::tag_task(&id, &tags, p.mode)).await?;
    Ok(json!({ "task": task, "mode": p.mode }))
}

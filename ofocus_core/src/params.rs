//! Tool parameter structs. Their JSON Schema is what `tools/list` advertises.

use rmcp::model::JsonObject;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::OmniFocusError;
use crate::model::{IntervalUnit, ProjectStatus, TagMode};
use crate::sanitize::DEFAULT_MAX_ITEMS;

pub const MAX_LIST_LIMIT: u32 = 1000;
pub const MAX_SEARCH_LIMIT: u32 = 500;
pub const MAX_ESTIMATED_MINUTES: u32 = 10_080;
pub const MAX_REVIEW_STEPS: u32 = 365;

/// Bounds and cross-field rules that a schema alone cannot express.
pub trait ToolParams: DeserializeOwned + JsonSchema {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Deserialize and validate tool arguments. Any failure is terminal.
pub fn parse_params<T: ToolParams>(
    tool: &str,
    arguments: Option<JsonObject>,
) -> Result<T, OmniFocusError> {
    let invalid = |msg: String| {
        OmniFocusError::InvalidParams(format!("Invalid arguments for tool {}: {}", tool, msg))
    };
    let params: T = serde_json::from_value(Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| invalid(e.to_string()))?;
    params.validate().map_err(invalid)?;
    Ok(params)
}

/// Input schema for `T` with subschemas inlined.
pub fn input_schema<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.option_add_null_type = false;
        })
        .into_generator()
        .into_root_schema_for::<T>();
    let mut object = match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    };
    object.remove("$schema");
    object.remove("title");
    object
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    Arc::new(object)
}

fn default_limit() -> u32 {
    100
}

fn default_search_limit() -> u32 {
    50
}

fn check_limit(limit: u32, max: u32) -> Result<(), String> {
    if limit == 0 || limit > max {
        return Err(format!("limit must be between 1 and {}", max));
    }
    Ok(())
}

fn check_target(id: &Option<String>, name: &Option<String>) -> Result<(), String> {
    let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
    if blank(id) && blank(name) {
        return Err("Either id or name must be provided".to_string());
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    Ok(())
}

fn check_minutes(minutes: Option<u32>) -> Result<(), String> {
    match minutes {
        Some(m) if m == 0 || m > MAX_ESTIMATED_MINUTES => Err(format!(
            "estimatedMinutes must be between 1 and {}",
            MAX_ESTIMATED_MINUTES
        )),
        _ => Ok(()),
    }
}

fn check_tags(tags: &[String], min: usize) -> Result<(), String> {
    if tags.len() < min || tags.len() > DEFAULT_MAX_ITEMS {
        return Err(format!(
            "tags must contain between {} and {} items",
            min, DEFAULT_MAX_ITEMS
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListTasksParams {
    /// Only tasks in this project.
    pub project_id: Option<String>,
    /// Only tasks in the project matching this name.
    pub project_name: Option<String>,
    /// Only tasks carrying this exact tag.
    pub tag_name: Option<String>,
    pub flagged: Option<bool>,
    #[serde(default)]
    pub inbox_only: bool,
    /// Skip blocked and deferred tasks.
    #[serde(default)]
    pub available_only: bool,
    #[serde(default)]
    pub include_completed: bool,
    #[serde(default)]
    pub include_dropped: bool,
    /// YYYY-MM-DD or RFC 3339; due on or before.
    pub due_before: Option<String>,
    /// YYYY-MM-DD or RFC 3339; due on or after.
    pub due_after: Option<String>,
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 1000))]
    pub limit: u32,
}

impl ToolParams for ListTasksParams {
    fn validate(&self) -> Result<(), String> {
        check_limit(self.limit, MAX_LIST_LIMIT)?;
        if self.inbox_only && (self.project_id.is_some() || self.project_name.is_some()) {
            return Err("inboxOnly cannot be combined with projectId or projectName".to_string());
        }
        Ok(())
    }
}

/// Address one object by id or by name.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TargetParams {
    pub id: Option<String>,
    /// Case-insensitive; must match exactly one object.
    pub name: Option<String>,
}

impl ToolParams for TargetParams {
    fn validate(&self) -> Result<(), String> {
        check_target(&self.id, &self.name)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchTasksParams {
    /// Matched against task names and notes, case-insensitively.
    pub query: String,
    #[serde(default)]
    pub include_completed: bool,
    #[serde(default = "default_search_limit")]
    #[schemars(range(min = 1, max = 500))]
    pub limit: u32,
}

impl ToolParams for SearchTasksParams {
    fn validate(&self) -> Result<(), String> {
        if self.query.trim().is_empty() {
            return Err("query must not be empty".to_string());
        }
        check_limit(self.limit, MAX_SEARCH_LIMIT)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTaskParams {
    pub name: String,
    pub note: Option<String>,
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    /// Create as a subtask of this task.
    pub parent_task_id: Option<String>,
    /// Tag names; missing tags are created.
    #[schemars(length(max = 100))]
    pub tags: Option<Vec<String>>,
    pub due_date: Option<String>,
    pub defer_date: Option<String>,
    pub planned_date: Option<String>,
    pub flagged: Option<bool>,
    #[schemars(range(min = 1, max = 10080))]
    pub estimated_minutes: Option<u32>,
}

impl ToolParams for CreateTaskParams {
    fn validate(&self) -> Result<(), String> {
        check_name(&self.name)?;
        check_minutes(self.estimated_minutes)?;
        if let Some(tags) = &self.tags {
            check_tags(tags, 0)?;
        }
        if self.parent_task_id.is_some()
            && (self.project_id.is_some() || self.project_name.is_some())
        {
            return Err("parentTaskId cannot be combined with projectId or projectName".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTaskParams {
    pub id: Option<String>,
    pub name: Option<String>,
    pub new_name: Option<String>,
    pub note: Option<String>,
    pub due_date: Option<String>,
    pub defer_date: Option<String>,
    pub planned_date: Option<String>,
    #[serde(default)]
    pub clear_due_date: bool,
    #[serde(default)]
    pub clear_defer_date: bool,
    #[serde(default)]
    pub clear_planned_date: bool,
    pub flagged: Option<bool>,
    #[schemars(range(min = 1, max = 10080))]
    pub estimated_minutes: Option<u32>,
    /// Move the task into this project.
    pub project_id: Option<String>,
    pub project_name: Option<String>,
}

impl ToolParams for UpdateTaskParams {
    fn validate(&self) -> Result<(), String> {
        check_target(&self.id, &self.name)?;
        check_minutes(self.estimated_minutes)?;
        for (set, clear, field) in [
            (&self.due_date, self.clear_due_date, "dueDate"),
            (&self.defer_date, self.clear_defer_date, "deferDate"),
            (&self.planned_date, self.clear_planned_date, "plannedDate"),
        ] {
            if set.is_some() && clear {
                return Err(format!("{} cannot be set and cleared at once", field));
            }
        }
        let changed = self.new_name.is_some()
            || self.note.is_some()
            || self.due_date.is_some()
            || self.defer_date.is_some()
            || self.planned_date.is_some()
            || self.clear_due_date
            || self.clear_defer_date
            || self.clear_planned_date
            || self.flagged.is_some()
            || self.estimated_minutes.is_some()
            || self.project_id.is_some()
            || self.project_name.is_some();
        if !changed {
            return Err("At least one field to update must be provided".to_string());
        }
        if let Some(new_name) = &self.new_name {
            check_name(new_name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TagTaskParams {
    pub task_id: Option<String>,
    pub task_name: Option<String>,
    #[schemars(length(min = 1, max = 100))]
    pub tags: Vec<String>,
    #[serde(default)]
    pub mode: TagMode,
}

impl ToolParams for TagTaskParams {
    fn validate(&self) -> Result<(), String> {
        check_target(&self.task_id, &self.task_name)
            .map_err(|_| "Either taskId or taskName must be provided".to_string())?;
        check_tags(&self.tags, 1)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListProjectsParams {
    pub status: Option<ProjectStatus>,
    pub folder_name: Option<String>,
    #[serde(default)]
    pub include_completed: bool,
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 1000))]
    pub limit: u32,
}

impl ToolParams for ListProjectsParams {
    fn validate(&self) -> Result<(), String> {
        check_limit(self.limit, MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProjectParams {
    pub name: String,
    pub note: Option<String>,
    pub folder_name: Option<String>,
    #[serde(default)]
    pub sequential: bool,
    pub flagged: Option<bool>,
    pub due_date: Option<String>,
    pub defer_date: Option<String>,
    #[schemars(length(max = 100))]
    pub tags: Option<Vec<String>>,
}

impl ToolParams for CreateProjectParams {
    fn validate(&self) -> Result<(), String> {
        check_name(&self.name)?;
        if let Some(tags) = &self.tags {
            check_tags(tags, 0)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProjectParams {
    pub id: Option<String>,
    pub name: Option<String>,
    pub new_name: Option<String>,
    pub note: Option<String>,
    pub status: Option<ProjectStatus>,
    pub sequential: Option<bool>,
    pub flagged: Option<bool>,
    pub due_date: Option<String>,
    pub defer_date: Option<String>,
}

impl ToolParams for UpdateProjectParams {
    fn validate(&self) -> Result<(), String> {
        check_target(&self.id, &self.name)?;
        let changed = self.new_name.is_some()
            || self.note.is_some()
            || self.status.is_some()
            || self.sequential.is_some()
            || self.flagged.is_some()
            || self.due_date.is_some()
            || self.defer_date.is_some();
        if !changed {
            return Err("At least one field to update must be provided".to_string());
        }
        if let Some(new_name) = &self.new_name {
            check_name(new_name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ListContainersParams {
    #[serde(default)]
    pub include_dropped: bool,
}

impl ToolParams for ListContainersParams {}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateFolderParams {
    pub name: String,
    pub parent_folder_name: Option<String>,
}

impl ToolParams for CreateFolderParams {
    fn validate(&self) -> Result<(), String> {
        check_name(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTagParams {
    pub name: String,
    pub parent_tag_name: Option<String>,
}

impl ToolParams for CreateTagParams {
    fn validate(&self) -> Result<(), String> {
        check_name(&self.name)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectsForReviewParams {
    #[serde(default)]
    pub include_on_hold: bool,
    #[serde(default = "default_limit")]
    #[schemars(range(min = 1, max = 1000))]
    pub limit: u32,
}

impl ToolParams for ProjectsForReviewParams {
    fn validate(&self) -> Result<(), String> {
        check_limit(self.limit, MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MarkReviewedParams {
    #[schemars(length(min = 1, max = 100))]
    pub project_ids: Vec<String>,
}

impl ToolParams for MarkReviewedParams {
    fn validate(&self) -> Result<(), String> {
        if self.project_ids.is_empty() || self.project_ids.len() > DEFAULT_MAX_ITEMS {
            return Err(format!(
                "projectIds must contain between 1 and {} ids",
                DEFAULT_MAX_ITEMS
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetReviewIntervalParams {
    pub project_id: Option<String>,
    pub project_name: Option<String>,
    #[schemars(range(min = 1, max = 365))]
    pub steps: u32,
    pub unit: IntervalUnit,
}

impl ToolParams for SetReviewIntervalParams {
    fn validate(&self) -> Result<(), String> {
        check_target(&self.project_id, &self.project_name)
            .map_err(|_| "Either projectId or projectName must be provided".to_string())?;
        if self.steps == 0 || self.steps > MAX_REVIEW_STEPS {
            return Err(format!("steps must be between 1 and {}", MAX_REVIEW_STEPS));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(v: Value) -> Option<JsonObject> {
        match v {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    #[test]
    fn test_defaults_apply() {
        let p: ListTasksParams = parse_params("list_tasks", None).unwrap();
        assert_eq!(p.limit, 100);
        assert!(!p.include_completed);
        let s: SearchTasksParams =
            parse_params("search_tasks", args(json!({"query": "milk"}))).unwrap();
        assert_eq!(s.limit, 50);
    }

    #[test]
    fn test_empty_project_ids_rejected() {
        let err = parse_params::<MarkReviewedParams>(
            "mark_projects_reviewed",
            args(json!({"projectIds": []})),
        )
        .unwrap_err();
        assert!(matches!(err, OmniFocusError::InvalidParams(_)));
        assert!(err
            .to_string()
            .contains("Invalid arguments for tool mark_projects_reviewed"));
    }

    #[test]
    fn test_target_requires_id_or_name() {
        let err = parse_params::<TargetParams>("get_task", args(json!({}))).unwrap_err();
        assert!(err.to_string().contains("Either id or name must be provided"));
        assert!(parse_params::<TargetParams>("get_task", args(json!({"name": "Milk"}))).is_ok());
    }

    #[test]
    fn test_subtask_cannot_name_a_project() {
        let err = parse_params::<CreateTaskParams>(
            "create_task",
            args(json!({"name": "Sub", "parentTaskId": "t1", "projectName": "Garden"})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("parentTaskId cannot be combined"));
        assert!(parse_params::<CreateTaskParams>(
            "create_task",
            args(json!({"name": "Sub", "parentTaskId": "t1"})),
        )
        .is_ok());
    }

    #[test]
    fn test_update_needs_a_change() {
        let err = parse_params::<UpdateTaskParams>("update_task", args(json!({"id": "t1"})))
            .unwrap_err();
        assert!(err.to_string().contains("At least one field"));
        let err = parse_params::<UpdateTaskParams>(
            "update_task",
            args(json!({"id": "t1", "dueDate": "2026-01-01", "clearDueDate": true})),
        )
        .unwrap_err();
        assert!(err.to_string().contains("dueDate cannot be set and cleared"));
    }

    #[test]
    fn test_bounds_and_types() {
        assert!(parse_params::<ListTasksParams>("list_tasks", args(json!({"limit": 0}))).is_err());
        assert!(
            parse_params::<ListTasksParams>("list_tasks", args(json!({"limit": 1001}))).is_err()
        );
        assert!(parse_params::<SetReviewIntervalParams>(
            "set_review_interval",
            args(json!({"projectId": "p1", "steps": 366, "unit": "week"})),
        )
        .is_err());
        assert!(parse_params::<SetReviewIntervalParams>(
            "set_review_interval",
            args(json!({"projectId": "p1", "steps": 2, "unit": "fortnight"})),
        )
        .is_err());
        assert!(parse_params::<ListTasksParams>(
            "list_tasks",
            args(json!({"bogus": true})),
        )
        .is_err());
    }

    #[test]
    fn test_status_accepts_both_spellings() {
        let a: ListProjectsParams =
            parse_params("list_projects", args(json!({"status": "on_hold"}))).unwrap();
        let b: ListProjectsParams =
            parse_params("list_projects", args(json!({"status": "on hold status"}))).unwrap();
        assert_eq!(a.status, b.status);
    }

    #[test]
    fn test_schema_is_inlined_object() {
        let schema = input_schema::<TagTaskParams>();
        assert_eq!(schema.get("type"), Some(&json!("object")));
        let props = schema.get("properties").unwrap();
        assert!(props.get("taskId").is_some());
        assert!(props["mode"].to_string().contains("replace"));
        assert_eq!(schema.get("required"), Some(&json!(["tags"])));
        assert!(!schema.contains_key("definitions"));
    }
}

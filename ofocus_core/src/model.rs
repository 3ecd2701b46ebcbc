//! Records returned across the tool boundary.
//!
//! Every record is rebuilt from the automation host on each call; nothing here
//! is cached. Field names are camelCase on the wire.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParentRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub dropped: bool,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub defer_date: Option<String>,
    #[serde(default)]
    pub planned_date: Option<String>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub in_inbox: bool,
    #[serde(default)]
    pub recurrence: Option<String>,
    #[serde(default)]
    pub repetition_method: Option<String>,
    #[serde(default)]
    pub parent_task: Option<ParentRef>,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub child_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[serde(alias = "active status")]
    Active,
    #[serde(alias = "on hold status", alias = "on hold", alias = "onHold")]
    OnHold,
    #[serde(alias = "done status", alias = "completed")]
    Done,
    #[serde(alias = "dropped status")]
    Dropped,
}

impl ProjectStatus {
    /// Spelling used by the OmniFocus automation dictionary.
    pub fn jxa_value(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active status",
            ProjectStatus::OnHold => "on hold status",
            ProjectStatus::Done => "done status",
            ProjectStatus::Dropped => "dropped status",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Done => "done",
            ProjectStatus::Dropped => "dropped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub note: String,
    pub status: ProjectStatus,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub defer_date: Option<String>,
    #[serde(default)]
    pub folder_name: Option<String>,
    #[serde(default)]
    pub task_count: u32,
    #[serde(default)]
    pub sequential: bool,
    #[serde(default)]
    pub last_review_date: Option<String>,
    #[serde(default)]
    pub next_review_date: Option<String>,
    #[serde(default)]
    pub review_interval: Option<ReviewInterval>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FolderStatus {
    #[serde(alias = "active status")]
    Active,
    #[serde(alias = "dropped status", alias = "hidden")]
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub status: FolderStatus,
    #[serde(default)]
    pub project_count: u32,
    #[serde(default)]
    pub folder_count: u32,
    #[serde(default)]
    pub parent_folder_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagStatus {
    #[serde(alias = "active status")]
    Active,
    #[serde(alias = "on hold status")]
    OnHold,
    #[serde(alias = "dropped status", alias = "hidden")]
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub status: TagStatus,
    #[serde(default)]
    pub task_count: u32,
    #[serde(default = "default_true")]
    pub allows_next_action: bool,
    #[serde(default)]
    pub parent_tag_name: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    #[serde(alias = "days")]
    Day,
    #[serde(alias = "weeks")]
    Week,
    #[serde(alias = "months")]
    Month,
    #[serde(alias = "years")]
    Year,
}

impl IntervalUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            IntervalUnit::Day => "day",
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
            IntervalUnit::Year => "year",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewInterval {
    pub steps: u32,
    pub unit: IntervalUnit,
}

/// How `tag_task` combines the given tags with the task's current ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    #[default]
    Add,
    Remove,
    Replace,
}

/// What the doctor probe reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostInfo {
    pub version: String,
    #[serde(default)]
    pub inbox_tasks: u32,
    #[serde(default)]
    pub projects: u32,
    #[serde(default)]
    pub tags: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Result of a sequential batch: per-item failures never abort the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<BatchFailure>,
    pub summary: BatchSummary,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
            summary: BatchSummary::default(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn push_ok(&mut self, item: T) {
        self.succeeded.push(item);
        self.summary.total += 1;
        self.summary.succeeded += 1;
    }

    pub fn push_err(&mut self, id: impl Into<String>, message: impl Into<String>) {
        self.failed.push(BatchFailure {
            id: id.into(),
            message: message.into(),
        });
        self.summary.total += 1;
        self.summary.failed += 1;
    }
}

/// Outcome of a delete: the object no longer exists to be mapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deleted {
    pub id: String,
    pub name: String,
    pub deleted: bool,
}

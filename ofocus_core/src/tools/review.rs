use rmcp::model::Tool;
use serde_json::{json, Value};
use tracing::warn;

use super::{list_payload, tool};
use crate::error::OmniFocusError;
use crate::lookup::EntityKind;
use crate::model::{BatchOutcome, Project};
use crate::omnifocus::OmniFocus;
use crate::params::{MarkReviewedParams, ProjectsForReviewParams, SetReviewIntervalParams};
use crate::sanitize::SafeText;
use crate::script::review as script;

pub(super) fn tools() -> Vec<Tool> {
    vec![
        tool::<ProjectsForReviewParams>(
            "get_projects_for_review",
            "Projects Due For Review",
            "List active projects (optionally on-hold ones too) whose next review date has passed, oldest first.",
        ),
        tool::<MarkReviewedParams>(
            "mark_projects_reviewed",
            "Mark Projects Reviewed",
            "Mark up to 100 projects reviewed by id. Each project is processed independently; failures are reported per id and do not stop the batch.",
        ),
        tool::<SetReviewIntervalParams>(
            "set_review_interval",
            "Set Review Interval",
            "Set how often a project is reviewed, e.g. every 2 weeks.",
        ),
    ]
}

pub(super) async fn get_projects_for_review(
    of: OmniFocus,
    p: ProjectsForReviewParams,
) -> Result<Value, OmniFocusError> {
    let projects: Vec<Project> = of
        .eval(script::projects_for_review(p.include_on_hold, p.limit))
        .await?;
    list_payload("projects", projects)
}

/// Sequential fold over the ids; an item's failure is recorded, never raised.
pub(super) async fn mark_projects_reviewed(
    of: OmniFocus,
    p: MarkReviewedParams,
) -> Result<Value, OmniFocusError> {
    let outcome = mark_reviewed_batch(&of, &p.project_ids).await;
    Ok(serde_json::to_value(outcome)?)
}

async fn mark_reviewed_batch(of: &OmniFocus, ids: &[String]) -> BatchOutcome<Project> {
    let mut outcome = BatchOutcome::default();
    for raw in ids {
        let result = match SafeText::short(raw) {
            Ok(id) => of.eval::<Project>(script::mark_reviewed(&id)).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(project) => outcome.push_ok(project),
            Err(err) => {
                warn!(id = %raw, code = err.code_str(), "mark reviewed failed: {}", err);
                outcome.push_err(raw.as_str(), err.to_string());
            }
        }
    }
    outcome
}

pub(super) async fn set_review_interval(
    of: OmniFocus,
    p: SetReviewIntervalParams,
) -> Result<Value, OmniFocusError> {
    let id = of
        .target_id(
            EntityKind::Project,
            p.project_id.as_deref(),
            p.project_name.as_deref(),
            true,
        )
        .await?;
    let project: Project = of
        .eval(script::set_review_interval(&id, p.steps, p.unit))
        .await?;
    Ok(json!({ "project": project, "updated": true }))
}

use rmcp::model::Tool;
use serde_json::{json, Value};

use super::{list_payload, tool};
use crate::error::OmniFocusError;
use crate::lookup::EntityKind;
use crate::model::Project;
use crate::omnifocus::OmniFocus;
use crate::params::{CreateProjectParams, ListProjectsParams, TargetParams, UpdateProjectParams};
use crate::sanitize::SafeText;
use crate::script::projects::{self as script, NewProject, ProjectChanges, ProjectQuery};
use crate::script::ScriptDate;

pub(super) fn tools() -> Vec<Tool> {
    vec![
        tool::<ListProjectsParams>(
            "list_projects",
            "List Projects",
            "List projects, optionally filtered by status or folder. Done and dropped projects are excluded unless includeCompleted is set or a status is given.",
        ),
        tool::<TargetParams>(
            "get_project",
            "Get Project",
            "Get one project by id or by name.",
        ),
        tool::<CreateProjectParams>(
            "create_project",
            "Create Project",
            "Create a project at the top level or inside a folder (matched by name).",
        ),
        tool::<UpdateProjectParams>(
            "update_project",
            "Update Project",
            "Change a project's name, note, status (active, on_hold, done, dropped), ordering, flag or dates.",
        ),
    ]
}

pub(super) async fn list_projects(
    of: OmniFocus,
    p: ListProjectsParams,
) -> Result<Value, OmniFocusError> {
    let folder_id = of
        .optional_id(EntityKind::Folder, None, p.folder_name.as_deref())
        .await?;
    let projects: Vec<Project> = of
        .eval(script::list_projects(&ProjectQuery {
            status: p.status,
            folder_id,
            include_completed: p.include_completed,
            limit: p.limit,
        }))
        .await?;
    let mut payload = list_payload("projects", projects)?;
    if let Some(folder) = p.folder_name {
        payload["folderName"] = Value::from(folder);
    }
    Ok(payload)
}

pub(super) async fn get_project(of: OmniFocus, p: TargetParams) -> Result<Value, OmniFocusError> {
    let id = of
        .target_id(EntityKind::Project, p.id.as_deref(), p.name.as_deref(), true)
        .await?;
    let project: Project = of.eval(script::get_project(&id)).await?;
    Ok(json!({ "project": project }))
}

pub(super) async fn create_project(
    of: OmniFocus,
    p: CreateProjectParams,
) -> Result<Value, OmniFocusError> {
    let name = SafeText::short(&p.name)?;
    let note = p.note.as_deref().map(SafeText::note).transpose()?;
    let tags = SafeText::list(p.tags.as_deref().unwrap_or_default())?;
    let due_date = ScriptDate::parse_opt("dueDate", p.due_date.as_deref())?;
    let defer_date = ScriptDate::parse_opt("deferDate", p.defer_date.as_deref())?;
    let folder_id = of
        .optional_id(EntityKind::Folder, None, p.folder_name.as_deref())
        .await?;

    let project: Project = of
        .eval(script::create_project(&NewProject {
            name,
            note,
            folder_id,
            sequential: p.sequential,
            flagged: p.flagged,
            due_date,
            defer_date,
            tags,
        }))
        .await?;
    Ok(json!({ "project": project, "created": true }))
}

pub(super) async fn update_project(
    of: OmniFocus,
    p: UpdateProjectParams,
) -> Result<Value, OmniFocusError> {
    let changes = ProjectChanges {
        new_name: p.new_name.as_deref().map(SafeText::short).transpose()?,
        note: p.note.as_deref().map(SafeText::note).transpose()?,
        status: p.status,
        sequential: p.sequential,
        flagged: p.flagged,
        due_date: ScriptDate::parse_opt("dueDate", p.due_date.as_deref())?,
        defer_date: ScriptDate::parse_opt("deferDate", p.defer_date.as_deref())?,
    };
    let id = of
        .target_id(EntityKind::Project, p.id.as_deref(), p.name.as_deref(), true)
        .await?;
    let project: Project = of.eval(script::update_project(&id, &changes)).await?;
    Ok(json!({ "project": project, "updated": true }))
}

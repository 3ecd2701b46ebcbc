use super::{assemble, js_bool, lookup_by_id, ScriptDate};
use crate::lookup::EntityKind;
use crate::model::ProjectStatus;
use crate::sanitize::SafeText;

#[derive(Debug, Clone, Default)]
pub struct ProjectQuery {
    pub status: Option<ProjectStatus>,
    pub folder_id: Option<SafeText>,
    pub include_completed: bool,
    pub limit: u32,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: SafeText,
    pub note: Option<SafeText>,
    pub folder_id: Option<SafeText>,
    pub sequential: bool,
    pub flagged: Option<bool>,
    pub due_date: Option<ScriptDate>,
    pub defer_date: Option<ScriptDate>,
    pub tags: Vec<SafeText>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectChanges {
    pub new_name: Option<SafeText>,
    pub note: Option<SafeText>,
    pub status: Option<ProjectStatus>,
    pub sequential: Option<bool>,
    pub flagged: Option<bool>,
    pub due_date: Option<ScriptDate>,
    pub defer_date: Option<ScriptDate>,
}

pub fn list_projects(q: &ProjectQuery) -> String {
    let (setup, source) = match &q.folder_id {
        Some(id) => (
            lookup_by_id("folder", EntityKind::Folder, id),
            "folder.flattenedProjects()",
        ),
        None => (String::new(), "doc.flattenedProjects()"),
    };

    let filter = match q.status {
        Some(status) => format!(
            "if (safe(function () {{ return p.status(); }}, \"\") !== \"{}\") continue;",
            status.jxa_value()
        ),
        None if !q.include_completed => r#"var st = safe(function () { return p.status(); }, "");
  if (st === "done status" || st === "dropped status") continue;"#
            .to_string(),
        None => String::new(),
    };

    assemble(&format!(
        r#"{setup}
var source = {source};
var out = [];
for (var i = 0; i < source.length && out.length < {limit}; i++) {{
  var p = source[i];
  {filter}
  out.push(projectToJson(p));
}}
return ok(out);
"#,
        setup = setup,
        source = source,
        limit = q.limit,
        filter = filter,
    ))
}

pub fn get_project(id: &SafeText) -> String {
    assemble(&format!(
        "{}\nreturn ok(projectToJson(project));\n",
        lookup_by_id("project", EntityKind::Project, id)
    ))
}

pub fn create_project(p: &NewProject) -> String {
    let mut props = vec![
        format!("name: {}", p.name.literal()),
        format!("sequential: {}", js_bool(p.sequential)),
    ];
    if let Some(note) = &p.note {
        props.push(format!("note: {}", note.literal()));
    }
    if let Some(flagged) = p.flagged {
        props.push(format!("flagged: {}", js_bool(flagged)));
    }
    if let Some(due) = &p.due_date {
        props.push(format!("dueDate: {}", due.literal()));
    }
    if let Some(defer) = &p.defer_date {
        props.push(format!("deferDate: {}", defer.literal()));
    }

    let (lookup, container) = match &p.folder_id {
        Some(id) => (
            lookup_by_id("folder", EntityKind::Folder, id),
            "folder.projects",
        ),
        None => (String::new(), "doc.projects"),
    };
    let tags = p
        .tags
        .iter()
        .map(|tag| format!("app.add(ensureTag({}), {{ to: project.tags }});", tag.literal()))
        .collect::<Vec<_>>()
        .join("\n");

    assemble(&format!(
        r#"{lookup}
var project = app.Project({{ {props} }});
{container}.push(project);
{tags}
return ok(projectToJson(project));
"#,
        lookup = lookup,
        props = props.join(", "),
        container = container,
        tags = tags,
    ))
}

pub fn update_project(id: &SafeText, c: &ProjectChanges) -> String {
    let mut lines = Vec::new();
    if let Some(name) = &c.new_name {
        lines.push(format!("project.name = {};", name.literal()));
    }
    if let Some(note) = &c.note {
        lines.push(format!("project.note = {};", note.literal()));
    }
    if let Some(status) = c.status {
        lines.push(format!("project.status = \"{}\";", status.jxa_value()));
    }
    if let Some(sequential) = c.sequential {
        lines.push(format!("project.sequential = {};", js_bool(sequential)));
    }
    if let Some(flagged) = c.flagged {
        lines.push(format!("project.flagged = {};", js_bool(flagged)));
    }
    if let Some(due) = &c.due_date {
        lines.push(format!("project.dueDate = {};", due.literal()));
    }
    if let Some(defer) = &c.defer_date {
        lines.push(format!("project.deferDate = {};", defer.literal()));
    }

    assemble(&format!(
        "{}\n{}\nreturn ok(projectToJson(project));\n",
        lookup_by_id("project", EntityKind::Project, id),
        lines.join("\n")
    ))
}

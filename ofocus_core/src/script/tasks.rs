use super::{assemble, js_bool, lookup_by_id, lookup_by_name, ScriptDate};
use crate::lookup::EntityKind;
use crate::model::TagMode;
use crate::sanitize::SafeText;

#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub project_id: Option<SafeText>,
    pub tag_name: Option<SafeText>,
    pub flagged: Option<bool>,
    pub inbox_only: bool,
    pub available_only: bool,
    pub include_completed: bool,
    pub include_dropped: bool,
    pub due_before: Option<ScriptDate>,
    pub due_after: Option<ScriptDate>,
    pub limit: u32,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub name: SafeText,
    pub note: Option<SafeText>,
    pub project_id: Option<SafeText>,
    pub parent_task_id: Option<SafeText>,
    pub tags: Vec<SafeText>,
    pub due_date: Option<ScriptDate>,
    pub defer_date: Option<ScriptDate>,
    pub planned_date: Option<ScriptDate>,
    pub flagged: Option<bool>,
    pub estimated_minutes: Option<u32>,
}

/// A date field in an update: untouched, set, or cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DateChange {
    #[default]
    Keep,
    Set(ScriptDate),
    Clear,
}

impl DateChange {
    fn assignment(&self, target: &str, property: &str) -> Option<String> {
        match self {
            DateChange::Keep => None,
            DateChange::Set(date) => Some(format!("{}.{} = {};", target, property, date.literal())),
            DateChange::Clear => Some(format!("{}.{} = null;", target, property)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub new_name: Option<SafeText>,
    pub note: Option<SafeText>,
    pub due_date: DateChange,
    pub defer_date: DateChange,
    pub planned_date: DateChange,
    pub flagged: Option<bool>,
    pub estimated_minutes: Option<u32>,
    pub project_id: Option<SafeText>,
}

pub fn list_tasks(q: &TaskQuery) -> String {
    let mut setup = String::new();
    let source = match &q.project_id {
        Some(id) => {
            setup.push_str(&lookup_by_id("project", EntityKind::Project, id));
            "project.flattenedTasks()"
        }
        None if q.inbox_only => "doc.inboxTasks()",
        None => "doc.flattenedTasks()",
    };

    let mut skips: Vec<String> = Vec::new();
    if !q.include_completed {
        skips.push("if (t.completed()) continue;".to_string());
    }
    if !q.include_dropped {
        skips.push("if (safe(function () { return t.dropped(); }, false)) continue;".to_string());
    }
    if let Some(flagged) = q.flagged {
        skips.push(format!("if (t.flagged() !== {}) continue;", js_bool(flagged)));
    }
    if q.available_only {
        skips.push("if (!isAvailable(t)) continue;".to_string());
    }
    if let Some(tag) = &q.tag_name {
        setup.push_str(&lookup_by_name("tag", EntityKind::Tag, tag));
        skips.push("if (!hasTag(t, tag)) continue;".to_string());
    }
    if let Some(before) = &q.due_before {
        skips.push(format!(
            "var dueB = t.dueDate(); if (!dueB || dueB > {}) continue;",
            before.literal()
        ));
    }
    if let Some(after) = &q.due_after {
        skips.push(format!(
            "var dueA = t.dueDate(); if (!dueA || dueA < {}) continue;",
            after.literal()
        ));
    }

    assemble(&format!(
        r#"
var now = new Date();
function isAvailable(t) {{
  if (t.completed() || safe(function () {{ return t.effectivelyDropped(); }}, false)) return false;
  if (safe(function () {{ return t.blocked(); }}, false)) return false;
  var deferred = safe(function () {{ return t.effectiveDeferDate(); }}, null);
  return !deferred || deferred <= now;
}}
{setup}
var source = {source};
var out = [];
for (var i = 0; i < source.length && out.length < {limit}; i++) {{
  var t = source[i];
  {skips}
  out.push(taskToJson(t));
}}
return ok(out);
"#,
        setup = setup,
        source = source,
        limit = q.limit,
        skips = skips.join("\n  "),
    ))
}

pub fn get_task(id: &SafeText) -> String {
    assemble(&format!(
        "{}\nreturn ok(taskToJson(task));\n",
        lookup_by_id("task", EntityKind::Task, id)
    ))
}

/// Case-insensitive match against name and note.
pub fn search_tasks(query: &SafeText, include_completed: bool, limit: u32) -> String {
    assemble(&format!(
        r#"
var items = doc.flattenedTasks;
var needle = {query}.toLowerCase();
var includeCompleted = {include_completed};
var names = items.name();
var notes = items.note();
var out = [];
for (var i = 0; i < names.length && out.length < {limit}; i++) {{
  var hit = (names[i] || "").toLowerCase().indexOf(needle) !== -1 ||
    (notes[i] || "").toLowerCase().indexOf(needle) !== -1;
  if (!hit) continue;
  var t = items[i];
  if (!includeCompleted && (t.completed() || safe(function () {{ return t.dropped(); }}, false))) continue;
  out.push(taskToJson(t));
}}
return ok(out);
"#,
        query = query.literal(),
        include_completed = js_bool(include_completed),
        limit = limit,
    ))
}

pub fn create_task(t: &NewTask) -> String {
    let mut props = vec![format!("name: {}", t.name.literal())];
    if let Some(note) = &t.note {
        props.push(format!("note: {}", note.literal()));
    }
    if let Some(flagged) = t.flagged {
        props.push(format!("flagged: {}", js_bool(flagged)));
    }
    if let Some(due) = &t.due_date {
        props.push(format!("dueDate: {}", due.literal()));
    }
    if let Some(defer) = &t.defer_date {
        props.push(format!("deferDate: {}", defer.literal()));
    }
    if let Some(minutes) = t.estimated_minutes {
        props.push(format!("estimatedMinutes: {}", minutes));
    }

    let (lookup, create) = if let Some(parent) = &t.parent_task_id {
        (
            lookup_by_id("parent", EntityKind::Task, parent),
            "var task = app.Task(props);\nparent.tasks.push(task);",
        )
    } else if let Some(project) = &t.project_id {
        (
            lookup_by_id("project", EntityKind::Project, project),
            "var task = app.Task(props);\nproject.tasks.push(task);",
        )
    } else {
        (
            String::new(),
            "var task = app.InboxTask(props);\ndoc.inboxTasks.push(task);",
        )
    };

    let planned = t
        .planned_date
        .as_ref()
        .map(|d| format!("task.plannedDate = {};", d.literal()))
        .unwrap_or_default();
    let tags = t
        .tags
        .iter()
        .map(|tag| format!("app.add(ensureTag({}), {{ to: task.tags }});", tag.literal()))
        .collect::<Vec<_>>()
        .join("\n");

    assemble(&format!(
        r#"
{lookup}
var props = {{ {props} }};
{create}
{planned}
{tags}
return ok(taskToJson(task));
"#,
        lookup = lookup,
        props = props.join(", "),
        create = create,
        planned = planned,
        tags = tags,
    ))
}

pub fn update_task(id: &SafeText, c: &TaskChanges) -> String {
    let mut lines = Vec::new();
    if let Some(name) = &c.new_name {
        lines.push(format!("task.name = {};", name.literal()));
    }
    if let Some(note) = &c.note {
        lines.push(format!("task.note = {};", note.literal()));
    }
    lines.extend(c.due_date.assignment("task", "dueDate"));
    lines.extend(c.defer_date.assignment("task", "deferDate"));
    lines.extend(c.planned_date.assignment("task", "plannedDate"));
    if let Some(flagged) = c.flagged {
        lines.push(format!("task.flagged = {};", js_bool(flagged)));
    }
    if let Some(minutes) = c.estimated_minutes {
        lines.push(format!("task.estimatedMinutes = {};", minutes));
    }
    let mut lookups = lookup_by_id("task", EntityKind::Task, id);
    if let Some(project) = &c.project_id {
        lookups.push_str(&lookup_by_id("target", EntityKind::Project, project));
        lines.push("app.move(task, { to: target.tasks.end });".to_string());
    }

    assemble(&format!(
        "{}\n{}\nreturn ok(taskToJson(task));\n",
        lookups,
        lines.join("\n")
    ))
}

pub fn complete_task(id: &SafeText) -> String {
    assemble(&format!(
        r#"{lookup}
if (task.completed()) {{
  return fail("invalid", "Task is already completed: " + task.name());
}}
app.markComplete(task);
return ok(taskToJson(task));
"#,
        lookup = lookup_by_id("task", EntityKind::Task, id),
    ))
}

pub fn drop_task(id: &SafeText) -> String {
    assemble(&format!(
        r#"{lookup}
if (safe(function () {{ return task.dropped(); }}, false)) {{
  return fail("invalid", "Task is already dropped: " + task.name());
}}
app.markDropped(task);
return ok(taskToJson(task));
"#,
        lookup = lookup_by_id("task", EntityKind::Task, id),
    ))
}

pub fn delete_task(id: &SafeText) -> String {
    assemble(&format!(
        r#"{lookup}
var deleted = {{ id: task.id(), name: task.name(), deleted: true }};
app.delete(task);
return ok(deleted);
"#,
        lookup = lookup_by_id("task", EntityKind::Task, id),
    ))
}

pub fn tag_task(id: &SafeText, tags: &[SafeText], mode: TagMode) -> String {
    let names = tags
        .iter()
        .map(SafeText::literal)
        .collect::<Vec<_>>()
        .join(", ");
    let action = match mode {
        TagMode::Add => {
            r#"names.forEach(function (n) {
  var g = ensureTag(n);
  if (!hasTag(task, g)) app.add(g, { to: task.tags });
});"#
        }
        TagMode::Remove => {
            r#"names.forEach(function (n) {
  var g = byName(doc.flattenedTags, n);
  if (g && hasTag(task, g)) app.remove(g, { from: task.tags });
});"#
        }
        TagMode::Replace => {
            r#"task.tags().forEach(function (g) { app.remove(g, { from: task.tags }); });
names.forEach(function (n) { app.add(ensureTag(n), { to: task.tags }); });"#
        }
    };

    assemble(&format!(
        r#"{lookup}
var names = [{names}];
{action}
return ok(taskToJson(task));
"#,
        lookup = lookup_by_id("task", EntityKind::Task, id),
        names = names,
        action = action,
    ))
}

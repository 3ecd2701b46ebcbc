//! Fixed snippets that turn automation objects into DTO-shaped JS objects.

/// All mapper functions, appended after the prelude in every script.
pub const ALL: &str = r#"
function containerName(obj, kind) {
  var c = obj.container();
  return c && c.class() === kind ? c.name() : null;
}

function taskToJson(t) {
  var project = safe(function () { return t.containingProject(); }, null);
  var parent = safe(function () { return t.parentTask(); }, null);
  var childCount = safe(function () { return t.tasks.length; }, 0);
  var rule = safe(function () { return t.repetitionRule(); }, null);
  var projectId = project ? project.id() : null;
  return {
    id: t.id(),
    name: t.name(),
    note: safe(function () { return t.note(); }, "") || "",
    completed: safe(function () { return t.completed(); }, false),
    dropped: safe(function () { return t.dropped(); }, false),
    flagged: safe(function () { return t.flagged(); }, false),
    dueDate: iso(safe(function () { return t.dueDate(); }, null)),
    deferDate: iso(safe(function () { return t.deferDate(); }, null)),
    plannedDate: iso(safe(function () { return t.plannedDate(); }, null)),
    estimatedMinutes: safe(function () { return t.estimatedMinutes(); }, null),
    tags: safe(function () { return t.tags().map(function (g) { return g.name(); }); }, []),
    projectName: project ? project.name() : null,
    inInbox: safe(function () { return t.inInbox(); }, false),
    recurrence: rule ? (rule.recurrence || null) : null,
    repetitionMethod: rule ? (rule.repetitionMethod || null) : null,
    parentTask: parent && parent.id() !== projectId ? { id: parent.id(), name: parent.name() } : null,
    hasChildren: childCount > 0,
    childCount: childCount
  };
}

function projectToJson(p) {
  var folder = safe(function () { return p.folder(); }, null);
  var interval = safe(function () { return p.reviewInterval(); }, null);
  return {
    id: p.id(),
    name: p.name(),
    note: safe(function () { return p.note(); }, "") || "",
    status: safe(function () { return p.status(); }, "active status"),
    completed: safe(function () { return p.completed(); }, false),
    flagged: safe(function () { return p.flagged(); }, false),
    dueDate: iso(safe(function () { return p.dueDate(); }, null)),
    deferDate: iso(safe(function () { return p.deferDate(); }, null)),
    folderName: folder ? folder.name() : null,
    taskCount: safe(function () { return p.flattenedTasks.length; }, 0),
    sequential: safe(function () { return p.sequential(); }, false),
    lastReviewDate: iso(safe(function () { return p.lastReviewDate(); }, null)),
    nextReviewDate: iso(safe(function () { return p.nextReviewDate(); }, null)),
    reviewInterval: interval ? { steps: interval.steps, unit: interval.unit } : null
  };
}

function folderToJson(f) {
  return {
    id: f.id(),
    name: f.name(),
    status: safe(function () { return f.hidden(); }, false) ? "dropped" : "active",
    projectCount: safe(function () { return f.projects.length; }, 0),
    folderCount: safe(function () { return f.folders.length; }, 0),
    parentFolderName: safe(function () { return containerName(f, "folder"); }, null)
  };
}

function tagToJson(g) {
  var hidden = safe(function () { return g.hidden(); }, false);
  var allowsNext = safe(function () { return g.allowsNextAction(); }, true);
  return {
    id: g.id(),
    name: g.name(),
    status: hidden ? "dropped" : (allowsNext ? "active" : "on_hold"),
    taskCount: safe(function () { return g.tasks.length; }, 0),
    allowsNextAction: allowsNext,
    parentTagName: safe(function () { return containerName(g, "tag"); }, null)
  };
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mappers_emit_wire_field_names() {
        for field in [
            "plannedDate:",
            "repetitionMethod:",
            "parentTask:",
            "childCount:",
            "nextReviewDate:",
            "parentFolderName:",
            "allowsNextAction:",
            "parentTagName:",
        ] {
            assert!(ALL.contains(field), "missing {field}");
        }
    }

    #[test]
    fn test_mappers_have_no_template_placeholders() {
        assert!(!ALL.contains("${"));
    }
}

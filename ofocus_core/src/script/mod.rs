//! JXA script builders.
//!
//! A script is the prelude, the mapper snippets, then an operation body. Only
//! [`SafeText`], [`ScriptDate`] and plain numbers/booleans are ever spliced into
//! a body, so every free-text value has been through the sanitizer first.

pub mod folders;
pub mod mappers;
pub mod projects;
pub mod review;
pub mod tags;
pub mod tasks;

use chrono::{DateTime, Duration, Local, NaiveDate, SecondsFormat, TimeZone, Utc};

use crate::error::OmniFocusError;
use crate::lookup::EntityKind;
use crate::sanitize::SafeText;

const PRELUDE: &str = r#"
var app = Application('OmniFocus');
var doc = app.defaultDocument;

function iso(d) {
  return d ? d.toISOString() : null;
}

function safe(fn, fallback) {
  try {
    var v = fn();
    return v === undefined ? fallback : v;
  } catch (e) {
    return fallback;
  }
}

function ok(data) {
  return JSON.stringify({ ok: true, data: data === undefined ? null : data });
}

function fail(kind, message) {
  return JSON.stringify({ ok: false, error: { kind: kind, message: message } });
}

function byId(collection, id) {
  var found = collection.whose({ id: id })();
  return found.length ? found[0] : null;
}

function byName(collection, name) {
  var found = collection.whose({ name: name })();
  return found.length ? found[0] : null;
}

function ensureTag(name) {
  var tag = byName(doc.flattenedTags, name);
  if (!tag) {
    tag = app.Tag({ name: name });
    doc.tags.push(tag);
  }
  return tag;
}

function hasTag(item, tag) {
  var id = tag.id();
  return item.tags().some(function (g) { return g.id() === id; });
}
"#;

/// Assemble a complete script around `body`.
pub fn assemble(body: &str) -> String {
    let mut out = String::with_capacity(PRELUDE.len() + mappers::ALL.len() + body.len() + 8);
    out.push_str(PRELUDE);
    out.push_str(mappers::ALL);
    out.push('\n');
    out.push_str(body.trim_start_matches('\n'));
    out
}

/// A validated date, carried as a UTC RFC 3339 string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDate(String);

impl ScriptDate {
    /// Accepts RFC 3339 instants or `YYYY-MM-DD` (local midnight).
    pub fn parse(field: &str, input: &str) -> Result<Self, OmniFocusError> {
        Self::parse_with(field, input, false)
    }

    /// Like [`ScriptDate::parse`], but a `YYYY-MM-DD` value means the last
    /// millisecond of that local day. Used for inclusive upper bounds.
    pub fn parse_end_of_day(field: &str, input: &str) -> Result<Self, OmniFocusError> {
        Self::parse_with(field, input, true)
    }

    fn parse_with(field: &str, input: &str, end_of_day: bool) -> Result<Self, OmniFocusError> {
        let trimmed = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::from_utc(dt.with_timezone(&Utc)));
        }
        if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            let day = if end_of_day { day.succ_opt() } else { Some(day) };
            let midnight = day
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .and_then(|naive| Local.from_local_datetime(&naive).earliest())
                .ok_or_else(|| {
                    OmniFocusError::InvalidParams(format!(
                        "{} has no local midnight: \"{}\"",
                        field, input
                    ))
                })?;
            let instant = midnight.with_timezone(&Utc);
            return Ok(Self::from_utc(if end_of_day {
                instant - Duration::milliseconds(1)
            } else {
                instant
            }));
        }
        Err(OmniFocusError::InvalidParams(format!(
            "{} must be an ISO-8601 date (YYYY-MM-DD or RFC 3339), got \"{}\"",
            field, input
        )))
    }

    pub fn parse_end_of_day_opt(
        field: &str,
        input: Option<&str>,
    ) -> Result<Option<Self>, OmniFocusError> {
        input.map(|s| Self::parse_end_of_day(field, s)).transpose()
    }

    pub fn parse_opt(field: &str, input: Option<&str>) -> Result<Option<Self>, OmniFocusError> {
        input.map(|s| Self::parse(field, s)).transpose()
    }

    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn literal(&self) -> String {
        format!("new Date(\"{}\")", self.0)
    }
}

pub(crate) fn js_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

pub(crate) fn js_opt_text(value: Option<&SafeText>) -> String {
    value.map(SafeText::literal).unwrap_or_else(|| "null".to_string())
}

pub(crate) fn js_opt_date(value: Option<&ScriptDate>) -> String {
    value
        .map(ScriptDate::literal)
        .unwrap_or_else(|| "null".to_string())
}

fn collection(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Task => "doc.flattenedTasks",
        EntityKind::Project => "doc.flattenedProjects",
        EntityKind::Folder => "doc.flattenedFolders",
        EntityKind::Tag => "doc.flattenedTags",
    }
}

fn title(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Task => "Task",
        EntityKind::Project => "Project",
        EntityKind::Folder => "Folder",
        EntityKind::Tag => "Tag",
    }
}

/// Bind `var <name>` to the object with `id`, or return a not-found envelope.
pub(crate) fn lookup_by_id(name: &str, kind: EntityKind, id: &SafeText) -> String {
    format!(
        r#"
var {name} = byId({collection}, {id});
if (!{name}) {{
  return fail("not_found", "{title} not found: " + {id});
}}
"#,
        name = name,
        collection = collection(kind),
        title = title(kind),
        id = id.literal(),
    )
}

/// Bind `var <name>` to the object with exactly this name, or return not-found.
pub(crate) fn lookup_by_name(name: &str, kind: EntityKind, target: &SafeText) -> String {
    format!(
        r#"
var {name} = byName({collection}, {target});
if (!{name}) {{
  return fail("not_found", "{title} not found: " + {target});
}}
"#,
        name = name,
        collection = collection(kind),
        title = title(kind),
        target = target.literal(),
    )
}

/// Every object whose name contains `query`, case-insensitively, as
/// `{id, name, context}` records.
pub fn candidates(kind: EntityKind, query: &SafeText, include_completed: bool) -> String {
    let (keep, context) = match kind {
        EntityKind::Task => (
            if include_completed {
                "null"
            } else {
                "function (t) { return !t.completed() && !safe(function () { return t.dropped(); }, false); }"
            },
            r#"function (t) {
    if (t.inInbox()) return "Inbox";
    var p = t.containingProject();
    return p ? p.name() : null;
  }"#,
        ),
        EntityKind::Project => (
            "null",
            "function (p) { var f = p.folder(); return f ? f.name() : null; }",
        ),
        EntityKind::Folder => ("null", "function (f) { return containerName(f, \"folder\"); }"),
        EntityKind::Tag => ("null", "function (g) { return containerName(g, \"tag\"); }"),
    };

    assemble(&format!(
        r#"
var items = {collection};
var needle = {query}.toLowerCase();
var keep = {keep};
var contextOf = {context};
var names = items.name();
var ids = items.id();
var out = [];
for (var i = 0; i < names.length; i++) {{
  var n = names[i] || "";
  if (n.toLowerCase().indexOf(needle) === -1) continue;
  var item = items[i];
  if (keep && !keep(item)) continue;
  out.push({{ id: ids[i], name: n, context: safe(function () {{ return contextOf(item); }}, null) }});
}}
return ok(out);
"#,
        collection = collection(kind),
        query = query.literal(),
        keep = keep,
        context = context,
    ))
}

/// Cheap round trip used by `ofocus doctor`: app version and document counts.
pub fn probe() -> String {
    assemble(
        r#"
return ok({
  version: app.version(),
  inboxTasks: doc.inboxTasks.length,
  projects: doc.flattenedProjects.length,
  tags: doc.flattenedTags.length
});
"#,
    )
}

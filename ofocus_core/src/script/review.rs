//! Project review: due reviews, marking reviewed, review intervals.

use super::{assemble, lookup_by_id};
use crate::lookup::EntityKind;
use crate::model::IntervalUnit;
use crate::sanitize::SafeText;

/// Adds one review interval to a date; a missing interval counts as one week.
const ADVANCE: &str = r#"
function advance(from, interval) {
  var d = new Date(from.getTime());
  var steps = interval && interval.steps ? interval.steps : 1;
  var unit = String(interval && interval.unit ? interval.unit : "week");
  if (unit.indexOf("day") === 0) {
    d.setDate(d.getDate() + steps);
  } else if (unit.indexOf("month") === 0) {
    d.setMonth(d.getMonth() + steps);
  } else if (unit.indexOf("year") === 0) {
    d.setFullYear(d.getFullYear() + steps);
  } else {
    d.setDate(d.getDate() + 7 * steps);
  }
  return d;
}
"#;

/// Active (optionally on-hold) projects whose next review date has passed,
/// oldest first.
pub fn projects_for_review(include_on_hold: bool, limit: u32) -> String {
    let statuses = if include_on_hold {
        r#"["active status", "on hold status"]"#
    } else {
        r#"["active status"]"#
    };
    assemble(&format!(
        r#"
var now = new Date();
var wanted = {statuses};
var source = doc.flattenedProjects();
var due = [];
for (var i = 0; i < source.length; i++) {{
  var p = source[i];
  if (wanted.indexOf(safe(function () {{ return p.status(); }}, "")) === -1) continue;
  var next = safe(function () {{ return p.nextReviewDate(); }}, null);
  if (!next || next > now) continue;
  due.push({{ when: next.getTime(), project: p }});
}}
due.sort(function (a, b) {{ return a.when - b.when; }});
return ok(due.slice(0, {limit}).map(function (d) {{ return projectToJson(d.project); }}));
"#,
        statuses = statuses,
        limit = limit,
    ))
}

/// Set the last review to now and push the next review out by one interval.
pub fn mark_reviewed(id: &SafeText) -> String {
    assemble(&format!(
        r#"{advance}{lookup}
var now = new Date();
project.lastReviewDate = now;
project.nextReviewDate = advance(now, safe(function () {{ return project.reviewInterval(); }}, null));
return ok(projectToJson(project));
"#,
        advance = ADVANCE,
        lookup = lookup_by_id("project", EntityKind::Project, id),
    ))
}

pub fn set_review_interval(id: &SafeText, steps: u32, unit: IntervalUnit) -> String {
    assemble(&format!(
        r#"{advance}{lookup}
var interval = {{ unit: "{unit}", steps: {steps}, fixed: false }};
project.reviewInterval = interval;
var last = safe(function () {{ return project.lastReviewDate(); }}, null) || new Date();
project.nextReviewDate = advance(last, interval);
return ok(projectToJson(project));
"#,
        advance = ADVANCE,
        lookup = lookup_by_id("project", EntityKind::Project, id),
        unit = unit.as_str(),
        steps = steps,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projects_for_review_statuses() {
        let active = projects_for_review(false, 20);
        assert!(active.contains(r#"var wanted = ["active status"];"#));
        assert!(active.contains("due.slice(0, 20)"));
        let both = projects_for_review(true, 20);
        assert!(both.contains(r#""on hold status""#));
    }

    #[test]
    fn test_mark_reviewed_updates_both_dates() {
        let s = mark_reviewed(&SafeText::short("p1").unwrap());
        assert!(s.contains("function advance(from, interval)"));
        assert!(s.contains(r#"byId(doc.flattenedProjects, "p1")"#));
        assert!(s.contains("project.lastReviewDate = now;"));
        assert!(s.contains("project.nextReviewDate = advance(now"));
    }

    #[test]
    fn test_set_review_interval() {
        let s = set_review_interval(&SafeText::short("p1").unwrap(), 2, IntervalUnit::Month);
        assert!(s.contains(r#"var interval = { unit: "month", steps: 2, fixed: false };"#));
        assert!(s.contains("project.reviewInterval = interval;"));
    }
}

//! Name-based lookup with the exact-then-substring tie-break.

use serde::{Deserialize, Serialize};

use crate::error::OmniFocusError;

/// What kind of object a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Task,
    Project,
    Folder,
    Tag,
}

impl EntityKind {
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Task => "task",
            EntityKind::Project => "project",
            EntityKind::Folder => "folder",
            EntityKind::Tag => "tag",
        }
    }

    fn plural(self) -> &'static str {
        match self {
            EntityKind::Task => "tasks",
            EntityKind::Project => "projects",
            EntityKind::Folder => "folders",
            EntityKind::Tag => "tags",
        }
    }
}

/// One object whose name matched a lookup query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: String,
    pub name: String,
    /// Owning project, folder or parent tag; "Inbox" for inbox tasks.
    #[serde(default)]
    pub context: Option<String>,
}

impl Candidate {
    fn describe(&self) -> String {
        match &self.context {
            Some(ctx) if !ctx.is_empty() => {
                format!("\"{}\" (id: {}, in: {})", self.name, self.id, ctx)
            }
            _ => format!("\"{}\" (id: {})", self.name, self.id),
        }
    }
}

/// Pick a single candidate for `query`.
///
/// Exact (case-insensitive, full name) matches win. Otherwise every
/// case-insensitive substring match is considered: none is "not found", one is
/// the result, more than one is ambiguous and lists every match.
pub fn resolve(
    kind: EntityKind,
    query: &str,
    candidates: Vec<Candidate>,
) -> Result<Candidate, OmniFocusError> {
    let needle = query.to_lowercase();

    let mut matches: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&needle))
        .collect();

    let exact: Vec<usize> = matches
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name.to_lowercase() == needle)
        .map(|(i, _)| i)
        .collect();

    match exact.as_slice() {
        [only] => return Ok(matches.swap_remove(*only)),
        [] => {}
        _ => {
            let exact_matches = exact.iter().map(|&i| matches[i].clone()).collect();
            return Err(ambiguous(kind, query, exact_matches));
        }
    }

    match matches.len() {
        0 => Err(OmniFocusError::NotFound(format!(
            "No {} found matching \"{}\"",
            kind.label(),
            query
        ))),
        1 => Ok(matches.remove(0)),
        _ => Err(ambiguous(kind, query, matches)),
    }
}

fn ambiguous(kind: EntityKind, query: &str, matches: Vec<Candidate>) -> OmniFocusError {
    let listing = matches
        .iter()
        .map(|c| format!("- {}", c.describe()))
        .collect::<Vec<_>>()
        .join("\n");
    OmniFocusError::Ambiguous {
        message: format!(
            "Ambiguous {} name \"{}\": {} {} match. Use one of these ids instead:\n{}",
            kind.label(),
            query,
            matches.len(),
            kind.plural(),
            listing
        ),
        matches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(id: &str, name: &str, ctx: Option<&str>) -> Candidate {
        Candidate {
            id: id.to_string(),
            name: name.to_string(),
            context: ctx.map(str::to_string),
        }
    }

    #[test]
    fn test_zero_matches_is_not_found() {
        let err = resolve(
            EntityKind::Project,
            "Garden",
            vec![cand("p1", "Taxes", None)],
        )
        .unwrap_err();
        assert!(matches!(err, OmniFocusError::NotFound(_)));
        assert!(err.to_string().contains("No project found"));
    }

    #[test]
    fn test_single_substring_match_is_returned() {
        let found = resolve(
            EntityKind::Task,
            "milk",
            vec![cand("t1", "Buy MILK", Some("Errands")), cand("t2", "Call bank", None)],
        )
        .unwrap();
        assert_eq!(found.id, "t1");
    }

    #[test]
    fn test_multiple_matches_list_every_id() {
        let err = resolve(
            EntityKind::Task,
            "report",
            vec![
                cand("a1", "Write report", Some("Work")),
                cand("b2", "Report expenses", Some("Inbox")),
                cand("c3", "Unrelated", None),
            ],
        )
        .unwrap_err();
        match err {
            OmniFocusError::Ambiguous { message, matches } => {
                assert_eq!(matches.len(), 2);
                assert!(message.contains("a1"));
                assert!(message.contains("b2"));
                assert!(message.contains("in: Work"));
                assert!(!message.contains("c3"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_exact_match_beats_substring_matches() {
        let found = resolve(
            EntityKind::Project,
            "home",
            vec![
                cand("p1", "Home improvement", None),
                cand("p2", "Home", Some("Personal")),
                cand("p3", "Homework", None),
            ],
        )
        .unwrap();
        assert_eq!(found.id, "p2");
    }

    #[test]
    fn test_duplicate_exact_names_are_ambiguous() {
        let err = resolve(
            EntityKind::Tag,
            "Waiting",
            vec![
                cand("g1", "Waiting", Some("People")),
                cand("g2", "waiting", None),
                cand("g3", "Waiting for", None),
            ],
        )
        .unwrap_err();
        match err {
            OmniFocusError::Ambiguous { matches, .. } => {
                let ids: Vec<_> = matches.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(ids, vec!["g1", "g2"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

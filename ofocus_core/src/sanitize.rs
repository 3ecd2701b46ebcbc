//! Input validation and escaping for text that ends up inside generated scripts.
//!
//! Every caller-supplied string (names, notes, ids, search queries) passes
//! through [`SafeText::new`] before a script builder may splice it into JXA
//! source. Validation runs in a fixed order: type, length, control characters,
//! then the deny-list. The first violated rule is the one reported.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

pub const DEFAULT_MAX_LENGTH: usize = 500;
pub const NOTE_MAX_LENGTH: usize = 10_000;
pub const MAX_CONTROL_CHARS: usize = 10;
pub const DEFAULT_MAX_ITEMS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanitizeError {
    #[error("Input must be a string, got {0}")]
    NotAString(&'static str),

    #[error("Input exceeds maximum length of {max} characters")]
    TooLong { max: usize },

    #[error("Input contains too many control characters ({count} > {max})")]
    TooManyControlChars { count: usize, max: usize },

    #[error("Input contains forbidden pattern: {rule}")]
    Forbidden { rule: &'static str },

    #[error("Array exceeds maximum of {max} items")]
    TooManyItems { max: usize },

    #[error("Invalid item at index {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<SanitizeError>,
    },
}

/// Ordered deny-list. Order matters: the first matching rule is reported.
static DENY_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\$\{", "template literal injection"),
        (r"\beval\s*\(", "eval() call"),
        (r"\bnew\s+Function\b|\bFunction\s*\(", "Function constructor"),
        (r"\bset(?:Timeout|Interval)\s*\(", "timer-based code execution"),
        (r"\bdoShellScript\b", "shell execution"),
        (
            r#"\brequire\s*\(|\bimport\s*\(|\bimport\s+.+\s+from\s+['"]"#,
            "module loading",
        ),
        (r"\bObjC\s*\.", "Objective-C bridge access"),
        (r"__proto__|\.\s*prototype\b", "prototype pollution"),
        (r"\.\s*constructor\b|\bconstructor\s*\[", "constructor access"),
        (
            r"\bprocess\s*\.\s*(?:env|exit|argv|mainModule|binding|kill)\b",
            "process object access",
        ),
        (r"\bglobalThis\b|\bglobal\s*[.\[]", "global object access"),
    ]
    .into_iter()
    .map(|(pattern, rule)| {
        let re = Regex::new(&format!("(?i){}", pattern)).expect("deny-list pattern must compile");
        (re, rule)
    })
    .collect()
});

/// Validate `input` and return it escaped for a double-quoted JS string literal.
pub fn sanitize(input: &str, max_len: usize) -> Result<String, SanitizeError> {
    validate(input, max_len)?;
    Ok(escape(input))
}

/// Like [`sanitize`], but for an untyped JSON value.
pub fn sanitize_value(input: &Value, max_len: usize) -> Result<String, SanitizeError> {
    match input {
        Value::String(s) => sanitize(s, max_len),
        other => Err(SanitizeError::NotAString(json_type_name(other))),
    }
}

/// Validate every element; abort on the first failure without producing output.
pub fn sanitize_array<S: AsRef<str>>(
    items: &[S],
    max_items: usize,
    max_len: usize,
) -> Result<Vec<String>, SanitizeError> {
    if items.len() > max_items {
        return Err(SanitizeError::TooManyItems { max: max_items });
    }
    for (index, item) in items.iter().enumerate() {
        validate(item.as_ref(), max_len).map_err(|e| SanitizeError::Element {
            index,
            source: Box::new(e),
        })?;
    }
    Ok(items.iter().map(|s| escape(s.as_ref())).collect())
}

fn validate(input: &str, max_len: usize) -> Result<(), SanitizeError> {
    if input.chars().count() > max_len {
        return Err(SanitizeError::TooLong { max: max_len });
    }

    let control = input
        .chars()
        .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        .count();
    if control > MAX_CONTROL_CHARS {
        return Err(SanitizeError::TooManyControlChars {
            count: control,
            max: MAX_CONTROL_CHARS,
        });
    }

    if let Some((_, rule)) = DENY_RULES.iter().find(|(re, _)| re.is_match(input)) {
        return Err(SanitizeError::Forbidden { rule });
    }

    Ok(())
}

/// Fixed escaping transform. Not idempotent: escaping twice compounds.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\'' => out.push_str("\\'"),
            '`' => out.push_str("\\`"),
            '$' => out.push_str("\\$"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\u0000"),
            c => out.push(c),
        }
    }
    out
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Caller text that has passed validation, kept in raw and escaped form.
///
/// Script builders only accept `SafeText`, so nothing unvalidated can be
/// spliced into generated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeText {
    raw: String,
    escaped: String,
}

impl SafeText {
    pub fn new(input: &str, max_len: usize) -> Result<Self, SanitizeError> {
        let escaped = sanitize(input, max_len)?;
        Ok(Self {
            raw: input.to_string(),
            escaped,
        })
    }

    /// Short free text: names, ids, queries.
    pub fn short(input: &str) -> Result<Self, SanitizeError> {
        Self::new(input, DEFAULT_MAX_LENGTH)
    }

    /// Long free text: notes.
    pub fn note(input: &str) -> Result<Self, SanitizeError> {
        Self::new(input, NOTE_MAX_LENGTH)
    }

    pub fn list<S: AsRef<str>>(items: &[S]) -> Result<Vec<Self>, SanitizeError> {
        let escaped = sanitize_array(items, DEFAULT_MAX_ITEMS, DEFAULT_MAX_LENGTH)?;
        Ok(items
            .iter()
            .zip(escaped)
            .map(|(raw, escaped)| Self {
                raw: raw.as_ref().to_string(),
                escaped,
            })
            .collect())
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn escaped(&self) -> &str {
        &self.escaped
    }

    /// The value as a double-quoted JS string literal.
    pub fn literal(&self) -> String {
        format!("\"{}\"", self.escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_literal_rejected() {
        let err = sanitize("${malicious}", DEFAULT_MAX_LENGTH).unwrap_err();
        assert!(err.to_string().contains("template literal injection"));
    }

    #[test]
    fn test_length_ceiling() {
        let exact = "a".repeat(500);
        assert_eq!(sanitize(&exact, DEFAULT_MAX_LENGTH).unwrap(), exact);

        let over = "a".repeat(501);
        let err = sanitize(&over, DEFAULT_MAX_LENGTH).unwrap_err();
        assert_eq!(err, SanitizeError::TooLong { max: 500 });
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let accented = "é".repeat(500);
        assert!(sanitize(&accented, DEFAULT_MAX_LENGTH).is_ok());
    }

    #[test]
    fn test_deny_list_is_case_insensitive() {
        for input in [
            "EVAL(1)",
            "Require('fs')",
            "x.__PROTO__",
            "PROCESS.ENV.HOME",
            "app.doShellScript('ls')",
            "GlobalThis",
            "ObjC.import('stdlib')",
            "setTimeout (f, 1)",
            "new function",
        ] {
            assert!(
                matches!(
                    sanitize(input, DEFAULT_MAX_LENGTH),
                    Err(SanitizeError::Forbidden { .. })
                ),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // Matches both template-literal and eval rules; the earlier rule is reported.
        let err = sanitize("${eval(1)}", DEFAULT_MAX_LENGTH).unwrap_err();
        assert_eq!(
            err,
            SanitizeError::Forbidden {
                rule: "template literal injection"
            }
        );
    }

    #[test]
    fn test_length_checked_before_deny_list() {
        let input = format!("{}${{x}}", "a".repeat(600));
        assert_eq!(
            sanitize(&input, DEFAULT_MAX_LENGTH).unwrap_err(),
            SanitizeError::TooLong { max: 500 }
        );
    }

    #[test]
    fn test_ordinary_text_passes() {
        for input in [
            "Call Mom about $50 refund",
            "Review process. Then ship",
            "Evaluate options (draft)",
            "Global launch plan",
            "Prototype the new UI",
        ] {
            assert!(sanitize(input, DEFAULT_MAX_LENGTH).is_ok(), "{input:?}");
        }
    }

    #[test]
    fn test_control_character_threshold() {
        let ten = "\u{1}".repeat(10);
        assert!(sanitize(&ten, DEFAULT_MAX_LENGTH).is_ok());

        let eleven = "\u{1}".repeat(11);
        assert_eq!(
            sanitize(&eleven, DEFAULT_MAX_LENGTH).unwrap_err(),
            SanitizeError::TooManyControlChars { count: 11, max: 10 }
        );

        let lines = "line\n".repeat(40);
        assert!(sanitize(&lines, NOTE_MAX_LENGTH).is_ok());
    }

    #[test]
    fn test_escape_order_and_compounding() {
        assert_eq!(escape(r#"a"b'c`d$e"#), r#"a\"b\'c\`d\$e"#);
        assert_eq!(escape("x\ny\tz\r\0"), "x\\ny\\tz\\r\\u0000");

        let once = escape("C:\\path");
        assert_eq!(once, "C:\\\\path");
        let twice = escape(&once);
        assert_eq!(twice, "C:\\\\\\\\path");
    }

    #[test]
    fn test_non_string_value_rejected() {
        let err = sanitize_value(&json!(42), DEFAULT_MAX_LENGTH).unwrap_err();
        assert_eq!(err, SanitizeError::NotAString("number"));
        assert_eq!(
            sanitize_value(&json!("ok"), DEFAULT_MAX_LENGTH).unwrap(),
            "ok"
        );
    }

    #[test]
    fn test_array_fails_on_bad_element() {
        let err = sanitize_array(&["ok", "__proto__"], DEFAULT_MAX_ITEMS, DEFAULT_MAX_LENGTH)
            .unwrap_err();
        match &err {
            SanitizeError::Element { index, source } => {
                assert_eq!(*index, 1);
                assert!(source.to_string().contains("prototype pollution"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("prototype pollution"));
    }

    #[test]
    fn test_array_item_ceiling() {
        let items: Vec<String> = (0..101).map(|i| format!("tag{i}")).collect();
        assert_eq!(
            sanitize_array(&items, DEFAULT_MAX_ITEMS, DEFAULT_MAX_LENGTH).unwrap_err(),
            SanitizeError::TooManyItems { max: 100 }
        );
        assert_eq!(
            sanitize_array(&items[..100], DEFAULT_MAX_ITEMS, DEFAULT_MAX_LENGTH)
                .unwrap()
                .len(),
            100
        );
    }

    #[test]
    fn test_safe_text_keeps_raw_and_literal() {
        let text = SafeText::short("Buy \"milk\"").unwrap();
        assert_eq!(text.raw(), "Buy \"milk\"");
        assert_eq!(text.literal(), r#""Buy \"milk\"""#);
    }
}

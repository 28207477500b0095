use std::path::Path;

use anyhow::{Context, Result};
use serde::de::IgnoredAny;
use swc_ecma_ast::Expr;

use super::{
    RawEntry,
    ecma::{flatten_object, parse_expression_source, unwrap_ts_expr},
};

/// Parse a JSON translation file.
///
/// The document is validated strictly with serde_json first; key positions come from
/// the swc expression parse of the same text. A top-level value that is not an object
/// has no keys.
pub fn parse(content: &str) -> Result<Vec<RawEntry>> {
    let body = content.strip_prefix('\u{feff}').unwrap_or(content);
    serde_json::from_str::<IgnoredAny>(body).context("Invalid JSON")?;

    let parsed = parse_expression_source(content, Path::new("translation.json"))?;
    let mut entries = Vec::new();
    if let Expr::Object(object) = unwrap_ts_expr(&parsed.expr) {
        flatten_object(object, "", &parsed.source_file, parsed.base, &mut entries);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::parsers::json::*;

    fn keys(entries: &[RawEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_flatten_nested() {
        let content = r#"{"Auth": {"Login": {"title": "Login", "button": "Submit"}}}"#;
        let entries = parse(content).unwrap();
        assert_eq!(keys(&entries), vec!["Auth.Login.title", "Auth.Login.button"]);
        assert_eq!(entries[1].value, "Submit");
    }

    #[test]
    fn test_offsets_point_at_key_token() {
        let content = "{\n  \"common\": {\n    \"hello\": \"Hello\"\n  }\n}\n";
        let entries = parse(content).unwrap();
        let entry = &entries[0];
        assert_eq!(
            &content[entry.offset..entry.offset + entry.length],
            "\"hello\""
        );
        assert_eq!(entry.segment, "hello");
        assert_eq!(entry.parent(), "common.");
    }

    #[test]
    fn test_same_leaf_in_other_namespace() {
        let content = r#"{"Auth": {"submit": "A"}, "Common": {"submit": "C"}}"#;
        let entries = parse(content).unwrap();
        let common = entries.iter().find(|e| e.key == "Common.submit").unwrap();
        assert!(common.offset > content.find("Common").unwrap());
    }

    #[test]
    fn test_non_string_leaves_are_skipped() {
        let content = r#"{"count": 3, "flag": true, "list": ["a", "b"], "none": null, "ok": "yes"}"#;
        assert_eq!(keys(&parse(content).unwrap()), vec!["ok"]);
    }

    #[test]
    fn test_escaped_values() {
        let entries = parse(r#"{"quote": "say \"hi\"\n", "emoji": "é"}"#).unwrap();
        assert_eq!(entries[0].value, "say \"hi\"\n");
        assert_eq!(entries[1].value, "é");
    }

    #[test]
    fn test_multibyte_offsets() {
        let content = r#"{"标题": "你好", "next": "x"}"#;
        let entries = parse(content).unwrap();
        let next = &entries[1];
        assert_eq!(&content[next.offset..next.offset + next.length], "\"next\"");
    }

    #[test]
    fn test_top_level_array_has_no_keys() {
        assert!(parse(r#"["a", "b"]"#).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse(r#"{"a": "b",}"#).is_err());
        assert!(parse(r#"{"a": 'b'}"#).is_err());
    }
}

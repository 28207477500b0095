use super::line_ending;
use crate::core::parsers::properties::{escape_key, escape_value};

pub fn encode_key(segment: &str) -> String {
    escape_key(segment)
}

/// Append `key=value` as a new line.
pub fn insert(content: &str, key: &str, value: &str) -> String {
    let newline = line_ending(content);
    let mut updated = content.to_string();
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push_str(newline);
    }
    updated.push_str(&escape_key(key));
    updated.push('=');
    updated.push_str(&escape_value(value));
    updated.push_str(newline);
    updated
}

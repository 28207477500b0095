//! TOML edits.
//!
//! New keys are written as dotted-key lines at the end of the deepest table section
//! on their path, or before the first table header. Structural edits re-serialize the
//! document with the toml crate, which drops comments.

use ::toml::{Table, Value};
use anyhow::{Context, Result, bail};

use super::{key_parts, line_ending, quoted};
use crate::core::parsers::toml::is_bare_key;

pub fn encode_key(segment: &str) -> String {
    if is_bare_key(segment) {
        segment.to_string()
    } else {
        quoted(segment)
    }
}

/// A `[table]` or `[[array]]` header line.
struct Header {
    name: Vec<String>,
    offset: usize,
}

pub fn insert_textual(content: &str, key: &str, value: &str) -> String {
    let parts = key_parts(key);
    let newline = line_ending(content);
    let headers = headers(content);

    let section = (1..parts.len()).rev().find_map(|depth| {
        headers
            .iter()
            .position(|h| h.name.iter().map(String::as_str).eq(parts[..depth].iter().copied()))
            .map(|index| (depth, index))
    });

    let (depth, section_end) = match section {
        Some((depth, index)) => (
            depth,
            headers.get(index + 1).map_or(content.len(), |next| next.offset),
        ),
        None => (0, headers.first().map_or(content.len(), |first| first.offset)),
    };

    let dotted: Vec<String> = parts[depth..].iter().map(|part| encode_key(part)).collect();
    let line = format!("{} = {}", dotted.join("."), quoted(value));

    let position = content[..section_end].trim_end().len();
    let (head, tail) = content.split_at(position);
    if head.is_empty() {
        format!("{}{}{}", line, newline, tail)
    } else if tail.is_empty() {
        format!("{}{}{}{}", head, newline, line, newline)
    } else {
        format!("{}{}{}{}", head, newline, line, tail)
    }
}

fn headers(content: &str) -> Vec<Header> {
    let mut headers = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(inner) = trimmed.strip_prefix('[') {
            let is_array = inner.starts_with('[');
            let inner = inner.trim_start_matches('[');
            if let Some(end) = inner.find(']') {
                let name = if is_array {
                    // Array tables never receive keys.
                    vec![String::new()]
                } else {
                    inner[..end]
                        .split('.')
                        .map(|part| part.trim().trim_matches(['"', '\'']).to_string())
                        .collect()
                };
                headers.push(Header { name, offset });
            }
        }
        offset += line.len();
    }
    headers
}

pub fn insert(content: &str, key: &str, value: &str) -> Result<String> {
    let mut root = load(content)?;
    insert_nested(&mut root, &key_parts(key), Value::String(value.to_string()))?;
    dump(&root)
}

pub fn rename(content: &str, old_key: &str, new_key: &str) -> Result<String> {
    let mut root = load(content)?;
    let value = remove_nested(&mut root, &key_parts(old_key))
        .with_context(|| format!("'{}' is not a nested key", old_key))?;
    insert_nested(&mut root, &key_parts(new_key), value)?;
    dump(&root)
}

fn load(content: &str) -> Result<Table> {
    ::toml::from_str(content).context("Invalid TOML")
}

fn dump(root: &Table) -> Result<String> {
    ::toml::to_string(root).context("Failed to write TOML")
}

fn insert_nested(table: &mut Table, path: &[&str], value: Value) -> Result<()> {
    let Some((first, rest)) = path.split_first() else {
        bail!("Empty key");
    };
    if rest.is_empty() {
        if table.contains_key(*first) {
            bail!("'{}' already exists", first);
        }
        table.insert(first.to_string(), value);
        return Ok(());
    }

    if !table.contains_key(*first) {
        table.insert(first.to_string(), Value::Table(Table::new()));
    }
    match table.get_mut(*first) {
        Some(Value::Table(child)) => insert_nested(child, rest, value),
        _ => bail!("'{}' holds a value, not a table", first),
    }
}

fn remove_nested(table: &mut Table, path: &[&str]) -> Option<Value> {
    let (first, rest) = path.split_first()?;
    if rest.is_empty() {
        return table.remove(*first);
    }
    let Some(Value::Table(child)) = table.get_mut(*first) else {
        return None;
    };
    let removed = remove_nested(child, rest)?;
    if child.is_empty() {
        table.remove(*first);
    }
    Some(removed)
}

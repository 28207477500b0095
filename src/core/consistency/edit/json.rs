//! JSON edits through the serde_json object model.
//!
//! Structural edits re-serialize the document with two-space indentation and a
//! trailing newline; key order is preserved.

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};

use super::{key_parts, quoted};

pub fn encode_key(segment: &str) -> String {
    quoted(segment)
}

pub fn insert(content: &str, key: &str, value: &str) -> Result<String> {
    let mut root = load(content)?;
    insert_nested(&mut root, &key_parts(key), Value::String(value.to_string()))?;
    save(&root)
}

pub fn rename(content: &str, old_key: &str, new_key: &str) -> Result<String> {
    let mut root = load(content)?;
    let value = remove_nested(&mut root, &key_parts(old_key))
        .with_context(|| format!("'{}' is not a nested key", old_key))?;
    insert_nested(&mut root, &key_parts(new_key), value)?;
    save(&root)
}

fn load(content: &str) -> Result<Map<String, Value>> {
    let body = content.strip_prefix('\u{feff}').unwrap_or(content);
    if body.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(body).context("Invalid JSON")? {
        Value::Object(map) => Ok(map),
        _ => bail!("The top-level JSON value is not an object"),
    }
}

fn save(root: &Map<String, Value>) -> Result<String> {
    let mut out = serde_json::to_string_pretty(root)?;
    out.push('\n');
    Ok(out)
}

/// Insert a value at a nested path, creating intermediate objects.
fn insert_nested(root: &mut Map<String, Value>, path: &[&str], value: Value) -> Result<()> {
    let Some((last, parents)) = path.split_last() else {
        bail!("Empty key");
    };

    let mut current = root;
    for part in parents {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => bail!("'{}' holds a value, not an object", part),
        };
    }
    if current.contains_key(*last) {
        bail!("'{}' already exists", last);
    }
    current.insert(last.to_string(), value);
    Ok(())
}

/// Remove the value at `path`, dropping objects left empty.
fn remove_nested(map: &mut Map<String, Value>, path: &[&str]) -> Option<Value> {
    let (first, rest) = path.split_first()?;
    if rest.is_empty() {
        return map.shift_remove(*first);
    }
    let Value::Object(child) = map.get_mut(*first)? else {
        return None;
    };
    let removed = remove_nested(child, rest)?;
    if child.is_empty() {
        map.shift_remove(*first);
    }
    Some(removed)
}

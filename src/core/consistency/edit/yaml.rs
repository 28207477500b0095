//! YAML edits.
//!
//! Insertions into block mappings add a line next to an existing sibling. Anything
//! else goes through the yaml-rust document model, which drops comments.

use anyhow::{Context, Result, anyhow, bail};
use yaml_rust::{Yaml, YamlEmitter, YamlLoader, yaml::Hash};

use super::{key_parts, line_ending, line_indent, quoted};
use crate::core::parsers::yaml::parse;

/// Spell a mapping key: plain when it reads back as the same string, quoted otherwise.
pub fn encode_key(segment: &str) -> String {
    if is_plain_safe(segment) {
        segment.to_string()
    } else {
        quoted(segment)
    }
}

fn is_plain_safe(text: &str) -> bool {
    let starts_ok = text
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    starts_ok
        && text.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
        && !matches!(
            text.to_ascii_lowercase().as_str(),
            "yes" | "no" | "on" | "off" | "y" | "n"
        )
        && matches!(Yaml::from_str(text), Yaml::String(_))
}

/// Insert `key` as new lines after the last sibling in its block mapping.
pub fn insert_textual(content: &str, key: &str, value: &str) -> Option<String> {
    let entries = parse(content).ok()?;
    let parts = key_parts(key);
    let newline = line_ending(content);

    // Number of leading parts naming a mapping that already exists.
    let depth = (1..parts.len())
        .rev()
        .find(|&depth| {
            let prefix = format!("{}.", parts[..depth].join("."));
            entries.iter().any(|e| e.key.starts_with(&prefix))
        })
        .unwrap_or(0);

    let (indent, position) = if depth == 0 {
        (String::new(), content.len())
    } else {
        let prefix = format!("{}.", parts[..depth].join("."));
        let sibling = entries
            .iter()
            .filter(|e| e.parent() == prefix)
            .max_by_key(|e| e.offset)?;
        let line_end = content[sibling.offset..]
            .find('\n')
            .map_or(content.len(), |i| sibling.offset + i + 1);
        (line_indent(content, sibling.offset), line_end)
    };

    let mut lines = String::new();
    if position > 0 && !content[..position].ends_with('\n') {
        lines.push_str(newline);
    }
    let rest = &parts[depth..];
    for (level, part) in rest.iter().enumerate() {
        lines.push_str(&indent);
        lines.push_str(&"  ".repeat(level));
        lines.push_str(&encode_key(part));
        lines.push(':');
        if level + 1 == rest.len() {
            lines.push(' ');
            lines.push_str(&quoted(value));
        }
        lines.push_str(newline);
    }

    Some(format!("{}{}{}", &content[..position], lines, &content[position..]))
}

pub fn insert(content: &str, key: &str, value: &str) -> Result<String> {
    let mut root = load(content)?;
    insert_nested(&mut root, &key_parts(key), Yaml::String(value.to_string()))?;
    dump(root)
}

pub fn rename(content: &str, old_key: &str, new_key: &str) -> Result<String> {
    let mut root = load(content)?;
    let value = remove_nested(&mut root, &key_parts(old_key))
        .with_context(|| format!("'{}' is not a nested key", old_key))?;
    insert_nested(&mut root, &key_parts(new_key), value)?;
    dump(root)
}

fn load(content: &str) -> Result<Hash> {
    let mut documents = YamlLoader::load_from_str(content).context("Invalid YAML")?;
    match documents.len() {
        0 => Ok(Hash::new()),
        1 => match documents.remove(0) {
            Yaml::Hash(hash) => Ok(hash),
            Yaml::Null => Ok(Hash::new()),
            _ => bail!("The top-level YAML value is not a mapping"),
        },
        _ => bail!("Multi-document YAML files cannot be restructured"),
    }
}

fn dump(root: Hash) -> Result<String> {
    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump(&Yaml::Hash(root))
        .map_err(|e| anyhow!("Failed to write YAML: {:?}", e))?;
    let mut body = out
        .strip_prefix("---")
        .map_or(out.as_str(), |rest| rest.trim_start_matches('\n'))
        .to_string();
    body.push('\n');
    Ok(body)
}

fn insert_nested(map: &mut Hash, path: &[&str], value: Yaml) -> Result<()> {
    let Some((first, rest)) = path.split_first() else {
        bail!("Empty key");
    };
    let name = Yaml::String(first.to_string());
    if rest.is_empty() {
        if map.contains_key(&name) {
            bail!("'{}' already exists", first);
        }
        map.insert(name, value);
        return Ok(());
    }

    if !map.contains_key(&name) {
        map.insert(name.clone(), Yaml::Hash(Hash::new()));
    }
    match map.get_mut(&name) {
        Some(Yaml::Hash(child)) => insert_nested(child, rest, value),
        _ => bail!("'{}' holds a value, not a mapping", first),
    }
}

fn remove_nested(map: &mut Hash, path: &[&str]) -> Option<Yaml> {
    let (first, rest) = path.split_first()?;
    let name = Yaml::String(first.to_string());
    if rest.is_empty() {
        return map.remove(&name);
    }
    let Some(Yaml::Hash(child)) = map.get_mut(&name) else {
        return None;
    };
    let removed = remove_nested(child, rest)?;
    if child.is_empty() {
        map.remove(&name);
    }
    Some(removed)
}

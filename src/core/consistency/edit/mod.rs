//! Structural edits of translation files.
//!
//! [`EditCapability`] computes the new content of a file when a key is inserted or
//! renamed; it never writes. [`FormatEditor`] implements it for every [`Format`]:
//!
//! - renames that keep the parent replace only the key token, so formatting and
//!   comments survive
//! - other edits are made textually where the layout allows it, and otherwise through
//!   the format's data model (which may reformat the file)
//!
//! Every result is parsed again and must keep all other keys and values intact, or
//! the edit is rejected.

use std::{collections::HashMap, path::Path};

use anyhow::{Result, bail};

use crate::core::parsers::{Format, RawEntry, parse_raw};

mod json;
mod properties;
mod script;
mod toml;
mod yaml;

/// Computes file content for key insertions and renames.
///
/// Keys are relative to the file: the file's key prefix is already removed.
pub trait EditCapability: Send + Sync {
    fn insert(
        &self,
        path: &Path,
        content: &str,
        format: Format,
        key: &str,
        value: &str,
    ) -> Result<String>;

    fn rename(
        &self,
        path: &Path,
        content: &str,
        format: Format,
        old_key: &str,
        new_key: &str,
    ) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FormatEditor;

impl EditCapability for FormatEditor {
    fn insert(
        &self,
        path: &Path,
        content: &str,
        format: Format,
        key: &str,
        value: &str,
    ) -> Result<String> {
        if key.is_empty() || key.split('.').any(str::is_empty) {
            bail!("Invalid key '{}'", key);
        }
        let before = entry_map(&parse_raw(content, format, path)?);
        if before.contains_key(key) {
            bail!("'{}' already exists in {}", key, path.display());
        }
        let check = |updated: &str| verify(path, format, &before, updated, &[(key, value)], None);

        if let Some(updated) = insert_textual(content, format, path, key, value)
            && check(&updated).is_ok()
        {
            return Ok(updated);
        }

        let updated = match format {
            Format::Json => json::insert(content, key, value)?,
            Format::Yaml => yaml::insert(content, key, value)?,
            Format::Toml => toml::insert(content, key, value)?,
            Format::Script | Format::Properties => {
                bail!("Cannot insert '{}' into {}", key, path.display())
            }
        };
        check(&updated)?;
        Ok(updated)
    }

    fn rename(
        &self,
        path: &Path,
        content: &str,
        format: Format,
        old_key: &str,
        new_key: &str,
    ) -> Result<String> {
        if new_key.is_empty() || new_key.split('.').any(str::is_empty) {
            bail!("Invalid key '{}'", new_key);
        }
        let entries = parse_raw(content, format, path)?;
        let Some(entry) = entries.iter().rev().find(|e| e.key == old_key) else {
            bail!("'{}' is not defined in {}", old_key, path.display());
        };
        let before = entry_map(&entries);
        if before.contains_key(new_key) {
            bail!("'{}' already exists in {}", new_key, path.display());
        }
        let check = |updated: &str| {
            verify(
                path,
                format,
                &before,
                updated,
                &[(new_key, entry.value.as_str())],
                Some(old_key),
            )
        };

        if let Some(updated) = rename_token(content, format, entry, new_key)
            && check(&updated).is_ok()
        {
            return Ok(updated);
        }
        tracing::debug!(
            "{}: '{}' cannot be renamed in place, rewriting structure",
            path.display(),
            old_key
        );

        let updated = match format {
            Format::Json => json::rename(content, old_key, new_key)?,
            Format::Yaml => yaml::rename(content, old_key, new_key)?,
            Format::Toml => toml::rename(content, old_key, new_key)?,
            Format::Script => bail!(
                "Moving '{}' to '{}' requires restructuring the object in {}",
                old_key,
                new_key,
                path.display()
            ),
            Format::Properties => bail!("Cannot rename '{}' in {}", old_key, path.display()),
        };
        check(&updated)?;
        Ok(updated)
    }
}

/// Replace the token spelling `entry`'s last segment when `new_key` keeps the parent.
fn rename_token(content: &str, format: Format, entry: &RawEntry, new_key: &str) -> Option<String> {
    let segment = new_key.strip_prefix(entry.parent())?;
    if segment.is_empty() || (format != Format::Properties && segment.contains('.')) {
        return None;
    }
    let token = match format {
        Format::Json => json::encode_key(segment),
        Format::Script => script::encode_key(segment),
        Format::Properties => properties::encode_key(segment),
        Format::Yaml => yaml::encode_key(segment),
        Format::Toml => toml::encode_key(segment),
    };
    splice(content, entry.offset, entry.length, &token)
}

fn insert_textual(
    content: &str,
    format: Format,
    path: &Path,
    key: &str,
    value: &str,
) -> Option<String> {
    match format {
        Format::Json => None,
        Format::Script => script::insert(content, path, key, value),
        Format::Properties => Some(properties::insert(content, key, value)),
        Format::Yaml => yaml::insert_textual(content, key, value),
        Format::Toml => Some(toml::insert_textual(content, key, value)),
    }
}

/// Replace `length` bytes at `offset` with `replacement`.
pub(crate) fn splice(content: &str, offset: usize, length: usize, replacement: &str) -> Option<String> {
    let before = content.get(..offset)?;
    let after = content.get(offset + length..)?;
    Some(format!("{}{}{}", before, replacement, after))
}

/// Quote `text` as a double-quoted string with JSON escapes.
fn quoted(text: &str) -> String {
    serde_json::Value::String(text.to_string()).to_string()
}

fn entry_map(entries: &[RawEntry]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|e| (e.key.clone(), e.value.clone()))
        .collect()
}

/// Check that `updated` holds `before`, minus `removed`, plus `expected`.
fn verify(
    path: &Path,
    format: Format,
    before: &HashMap<String, String>,
    updated: &str,
    expected: &[(&str, &str)],
    removed: Option<&str>,
) -> Result<()> {
    let after = entry_map(&parse_raw(updated, format, path)?);

    if let Some(removed) = removed
        && after.contains_key(removed)
    {
        bail!("'{}' is still defined after the edit", removed);
    }
    for (key, value) in before {
        if Some(key.as_str()) != removed && after.get(key) != Some(value) {
            bail!("The edit would change '{}'", key);
        }
    }
    for (key, value) in expected {
        if after.get(*key).map(String::as_str) != Some(*value) {
            bail!("The edit did not produce '{}'", key);
        }
    }
    let expected_len = before.len() + expected.len() - usize::from(removed.is_some());
    if after.len() != expected_len {
        bail!("The edit would add unrelated keys");
    }
    Ok(())
}

/// Split a key into its parts.
fn key_parts(key: &str) -> Vec<&str> {
    key.split('.').collect()
}

/// The line terminator used by `content`.
fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") { "\r\n" } else { "\n" }
}

/// Leading whitespace of the line containing `offset`.
fn line_indent(content: &str, offset: usize) -> String {
    let head = content.get(..offset).unwrap_or_default();
    let line_start = head.rfind('\n').map_or(0, |i| i + 1);
    content[line_start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

//! Translation file parsers.
//!
//! Every format flattens nested structures into dot-joined keys and keeps only string
//! leaves. Each parser returns [`RawEntry`] values in document order; [`parse`] turns
//! them into [`TranslationEntry`] values carrying the file's namespace context.
//!
//! - `ecma`: swc parsing helpers shared by JSON, script files and call-site scanning
//! - `json`, `script`, `properties`, `yaml`, `toml`: one parser per [`Format`]

use std::{collections::HashMap, fmt, path::Path, sync::Arc};

use anyhow::Result;

use crate::core::data::{FileRef, TranslationEntry};

pub mod ecma;
pub mod json;
pub mod properties;
pub mod script;
pub mod toml;
pub mod yaml;

/// Supported translation file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    /// JavaScript or TypeScript module exporting an object literal.
    Script,
    Properties,
    Yaml,
    Toml,
}

/// Extensions recognized as translation files.
pub const TRANSLATION_EXTENSIONS: &[&str] = &[
    "json",
    "js",
    "mjs",
    "cjs",
    "ts",
    "properties",
    "yaml",
    "yml",
    "toml",
];

impl Format {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "js" | "mjs" | "cjs" | "ts" => Some(Format::Script),
            "properties" => Some(Format::Properties),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::Script => write!(f, "script"),
            Format::Properties => write!(f, "properties"),
            Format::Yaml => write!(f, "yaml"),
            Format::Toml => write!(f, "toml"),
        }
    }
}

/// A flattened key as found in a file, before the file's key prefix is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Dot-joined key relative to the file.
    pub key: String,
    /// The trailing part of `key` spelled by the token at `offset`.
    pub segment: String,
    pub value: String,
    pub offset: usize,
    pub length: usize,
}

impl RawEntry {
    /// The part of `key` written by enclosing structures (`a.` for `a.b`).
    pub fn parent(&self) -> &str {
        self.key
            .strip_suffix(self.segment.as_str())
            .unwrap_or_default()
    }
}

/// Namespace context applied to every entry parsed from one file.
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub file: &'a FileRef,
    pub key_prefix: &'a str,
    pub locale: &'a str,
    pub module: Option<&'a str>,
}

/// Flat key/value pairs of one file, in document order.
pub fn parse_raw(content: &str, format: Format, path: &Path) -> Result<Vec<RawEntry>> {
    match format {
        Format::Json => json::parse(content),
        Format::Script => script::parse(content, path),
        Format::Properties => properties::parse(content),
        Format::Yaml => yaml::parse(content),
        Format::Toml => toml::parse(content),
    }
}

/// Parse a translation file into entries keyed by fully qualified key.
///
/// `format` of `None` (an unrecognized extension) yields no entries. Later definitions of
/// a duplicated key replace earlier ones.
pub fn parse(
    content: &str,
    format: Option<Format>,
    context: &ParseContext<'_>,
) -> Result<HashMap<String, Arc<TranslationEntry>>> {
    let Some(format) = format else {
        return Ok(HashMap::new());
    };

    let raw = parse_raw(content, format, context.file.path())?;
    let line_index = build_line_index(content);

    let mut entries = HashMap::with_capacity(raw.len());
    for RawEntry {
        key,
        value,
        offset,
        length,
        ..
    } in raw
    {
        let full_key = format!("{}{}", context.key_prefix, key);
        let entry = TranslationEntry {
            key: full_key.clone(),
            value,
            locale: context.locale.to_string(),
            file: context.file.clone(),
            offset,
            length,
            line: offset_to_line(&line_index, offset),
            module: context.module.map(str::to_string),
        };
        entries.insert(full_key, Arc::new(entry));
    }
    Ok(entries)
}

/// Join a parent key and a child segment with `.`.
pub(crate) fn join_key(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{}.{}", parent, child)
    }
}

/// Build an index of line start byte offsets for O(log n) line lookups.
///
/// Line 1 starts at offset 0, line 2 starts after the first '\n', etc.
pub fn build_line_index(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, b) in content.bytes().enumerate() {
        if b == b'\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

/// Find the 1-based line number for a byte offset using binary search.
pub fn offset_to_line(line_index: &[usize], offset: usize) -> usize {
    match line_index.binary_search(&offset) {
        Ok(line) => line + 1,
        Err(line) => line,
    }
}

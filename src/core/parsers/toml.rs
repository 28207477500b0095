//! TOML translation files.
//!
//! The toml deserializer keeps no positions. Offsets are located by searching the text
//! for each key token after its parent's token, accepting only matches whose enclosing
//! table header belongs to the same table. Tables may be re-opened later in the file,
//! so iteration order need not be document order. Offsets fall back to the parent's
//! position when no token is found and stay a navigation aid (keys repeated inside
//! multi-line strings can still mislead them).

use ::toml::{Table, Value};
use anyhow::{Context, Result};

use super::RawEntry;

pub fn parse(content: &str) -> Result<Vec<RawEntry>> {
    let table: Table = ::toml::from_str(content).context("Invalid TOML")?;
    let locator = KeyLocator::new(content);
    let mut entries = Vec::new();
    flatten_table(&table, &[], 0, &locator, &mut entries);
    Ok(entries)
}

fn flatten_table(
    table: &Table,
    parent: &[&str],
    from: usize,
    locator: &KeyLocator<'_>,
    out: &mut Vec<RawEntry>,
) {
    let mut cursor = from;
    for (name, value) in table {
        let (offset, length) = match locator.locate(name, parent, cursor) {
            Some(found) => {
                cursor = found.0 + found.1;
                found
            }
            None => (from.min(locator.content.len()), name.len()),
        };
        let mut path: Vec<&str> = parent.iter().copied().collect();
        path.push(name.as_str());
        match value {
            Value::String(text) => out.push(RawEntry {
                key: path.join("."),
                segment: name.clone(),
                value: text.clone(),
                offset,
                length,
            }),
            Value::Table(nested) => flatten_table(nested, &path, offset + length, locator, out),
            _ => {}
        }
    }
}

/// A `[table]` or `[[array]]` header line.
struct Header {
    start: usize,
    end: usize,
    path: Vec<String>,
}

struct KeyLocator<'a> {
    content: &'a str,
    headers: Vec<Header>,
}

impl<'a> KeyLocator<'a> {
    fn new(content: &'a str) -> Self {
        let mut headers = Vec::new();
        let mut start = 0;
        for line in content.split_inclusive('\n') {
            let trimmed = line.trim();
            if trimmed.starts_with('[') {
                let inner = trimmed
                    .split('#')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .trim_start_matches('[')
                    .trim_end_matches(']');
                headers.push(Header {
                    start,
                    end: start + line.len(),
                    path: inner
                        .split('.')
                        .map(|segment| segment.trim().trim_matches(['"', '\'']).to_string())
                        .collect(),
                });
            }
            start += line.len();
        }
        Self { content, headers }
    }

    /// Offset and length of the first token spelling `name` at or after `from` that
    /// belongs to the table `parent`.
    fn locate(&self, name: &str, parent: &[&str], from: usize) -> Option<(usize, usize)> {
        let mut candidates = vec![format!("\"{}\"", name), format!("'{}'", name)];
        if is_bare_key(name) {
            candidates.push(name.to_string());
        }

        candidates
            .iter()
            .filter_map(|token| {
                self.find_token(token, parent, from)
                    .map(|pos| (pos, token.len()))
            })
            .min_by_key(|(pos, _)| *pos)
    }

    fn find_token(&self, token: &str, parent: &[&str], from: usize) -> Option<usize> {
        let from = from.min(self.content.len());
        self.content[from..]
            .match_indices(token)
            .map(|(index, _)| from + index)
            .find(|&pos| self.is_key_at(pos, token.len()) && self.in_table(pos, parent))
    }

    fn is_key_at(&self, pos: usize, length: usize) -> bool {
        let bytes = self.content.as_bytes();
        let before_ok = pos == 0
            || matches!(
                bytes[pos - 1],
                b' ' | b'\t' | b'\n' | b'\r' | b'.' | b'[' | b'{' | b','
            );
        let after = self.content[pos + length..].trim_start_matches([' ', '\t']);
        before_ok && (after.starts_with('=') || after.starts_with('.') || after.starts_with(']'))
    }

    /// A token on a header line must extend `parent`; a token on a key line must sit
    /// under a header that `parent` extends.
    fn in_table(&self, pos: usize, parent: &[&str]) -> bool {
        let index = self.headers.partition_point(|header| header.start <= pos);
        let Some(header) = index.checked_sub(1).map(|i| &self.headers[i]) else {
            return true;
        };
        if pos < header.end {
            header.path.len() >= parent.len()
                && header.path.iter().zip(parent).all(|(a, b)| a == b)
        } else {
            parent.len() >= header.path.len()
                && header.path.iter().zip(parent).all(|(a, b)| a == b)
        }
    }
}

pub(crate) fn is_bare_key(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::parsers::toml::*;

    fn pairs(content: &str) -> Vec<(String, String)> {
        parse(content)
            .unwrap()
            .into_iter()
            .map(|e| (e.key, e.value))
            .collect()
    }

    #[test]
    fn test_tables_and_dotted_keys() {
        let content = "title = \"Top\"\n\n[common]\nhello = \"你好\"\nnav.home = \"Home\"\n\n[errors.http]\nnot_found = \"Missing\"\n";
        assert_eq!(
            pairs(content),
            vec![
                ("title".into(), "Top".into()),
                ("common.hello".into(), "你好".into()),
                ("common.nav.home".into(), "Home".into()),
                ("errors.http.not_found".into(), "Missing".into()),
            ]
        );
    }

    #[test]
    fn test_offsets_follow_document_order() {
        let content = "[a]\nx = \"1\"\n[b]\nx = \"2\"\n";
        let entries = parse(content).unwrap();
        assert_eq!(entries[0].offset, 4);
        assert_eq!(entries[1].offset, content.rfind("x =").unwrap());
        assert_eq!(entries[1].length, 1);
    }

    #[test]
    fn test_quoted_keys() {
        let content = "\"greet user\" = \"Hi\"\n";
        let entries = parse(content).unwrap();
        assert_eq!(entries[0].key, "greet user");
        assert_eq!(
            &content[entries[0].offset..entries[0].offset + entries[0].length],
            "\"greet user\""
        );
    }

    #[test]
    fn test_value_text_is_not_a_key() {
        let content = "a = \"b\"\nb = \"c\"\n";
        let entries = parse(content).unwrap();
        assert_eq!(entries[1].key, "b");
        assert_eq!(entries[1].offset, 8);
    }

    #[test]
    fn test_offsets_in_reopened_tables() {
        let content = "[a.b]\nx = \"1\"\n\n[c]\nz = \"2\"\n\n[a]\nz = \"3\"\n";
        let entries = parse(content).unwrap();
        let token = |key: &str| {
            let entry = entries.iter().find(|e| e.key == key).unwrap();
            (entry.offset, &content[entry.offset..entry.offset + entry.length])
        };

        assert_eq!(token("a.b.x"), (content.find("x =").unwrap(), "x"));
        assert_eq!(token("a.z"), (content.rfind("z =").unwrap(), "z"));
        assert_eq!(token("c.z"), (content.find("z =").unwrap(), "z"));
    }

    #[test]
    fn test_non_strings_skipped() {
        let content = "n = 1\nflag = true\nlist = [\"a\"]\n[[items]]\nname = \"x\"\n";
        assert!(pairs(content).is_empty());
    }

    #[test]
    fn test_inline_table() {
        assert_eq!(
            pairs("menu = { open = \"Open\", close = \"Close\" }\n"),
            vec![
                ("menu.open".into(), "Open".into()),
                ("menu.close".into(), "Close".into()),
            ]
        );
    }

    #[test]
    fn test_malformed_toml() {
        assert!(parse("a = \n").is_err());
        assert!(parse("[a\nb = 1").is_err());
    }
}

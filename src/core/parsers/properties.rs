//! Java-style `.properties` files.
//!
//! Supports `#`/`!` comments, `=`, `:` and whitespace separators, backslash line
//! continuations and the standard escapes (`\t \n \r \f \uXXXX`, escaped separators).

use anyhow::{Result, bail};

use super::RawEntry;

pub fn parse(content: &str) -> Result<Vec<RawEntry>> {
    let mut entries = Vec::new();
    let mut lines = PhysicalLines::new(content);

    while let Some((line_start, line)) = lines.next() {
        let trimmed = line.trim_start_matches([' ', '\t', '\x0c']);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        let key_start = line_start + (line.len() - trimmed.len());

        let mut logical = trimmed.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches([' ', '\t', '\x0c'])),
                None => break,
            }
        }

        let (raw_key_len, raw_value) = split_key_value(&logical);
        let key = unescape(&logical[..raw_key_len])?;
        let value = unescape(raw_value)?;

        entries.push(RawEntry {
            segment: key.clone(),
            key,
            value,
            offset: key_start,
            length: raw_key_len,
        });
    }

    Ok(entries)
}

/// Lines with their starting byte offsets, without line terminators.
struct PhysicalLines<'a> {
    content: &'a str,
    position: usize,
}

impl<'a> PhysicalLines<'a> {
    fn new(content: &'a str) -> Self {
        let position = if content.starts_with('\u{feff}') { 3 } else { 0 };
        Self { content, position }
    }
}

impl<'a> Iterator for PhysicalLines<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.content.len() {
            return None;
        }
        let start = self.position;
        let rest = &self.content[start..];
        let (line, consumed) = match rest.find('\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.position += consumed;
        Some((start, line.strip_suffix('\r').unwrap_or(line)))
    }
}

fn ends_with_continuation(line: &str) -> bool {
    line.bytes().rev().take_while(|b| *b == b'\\').count() % 2 == 1
}

/// Byte length of the raw key and the raw value that follows the separator.
fn split_key_value(line: &str) -> (usize, &str) {
    let mut key_len = line.len();
    let mut chars = line.char_indices();
    while let Some((index, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_len = index;
                break;
            }
            _ => {}
        }
    }

    let rest = line[key_len..].trim_start_matches([' ', '\t', '\x0c']);
    let rest = rest
        .strip_prefix(['=', ':'])
        .map_or(rest, |r| r.trim_start_matches([' ', '\t', '\x0c']));
    (key_len, rest)
}

fn unescape(raw: &str) -> Result<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = u32::from_str_radix(&hex, 16)
                    .ok()
                    .filter(|_| hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => out.push(ch),
                    None => bail!("Malformed \\uXXXX escape: \\u{}", hex),
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Escape a key for writing back into a properties file.
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '=' | ':' | ' ' | '#' | '!' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape a value for writing back into a properties file.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x0c' => out.push_str("\\f"),
            ' ' if i == 0 => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

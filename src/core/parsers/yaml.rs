//! YAML translation files.
//!
//! Positions are exact: the marked event stream of yaml-rust gives the start of every
//! key scalar. Multi-document files are flattened in document order; sequences,
//! aliases, complex keys and non-string scalars are skipped.

use anyhow::{Context, Result};
use yaml_rust::{
    Yaml,
    parser::{Event, MarkedEventReceiver, Parser},
    scanner::{Marker, TScalarStyle},
};

use super::{RawEntry, join_key};

pub fn parse(content: &str) -> Result<Vec<RawEntry>> {
    let mut receiver = FlatteningReceiver::new(content);
    let mut parser = Parser::new(content.chars());
    parser.load(&mut receiver, true).context("Invalid YAML")?;
    Ok(receiver.entries)
}

/// A key scalar waiting for its value.
#[derive(Debug)]
struct KeyToken {
    text: String,
    offset: usize,
    length: usize,
}

#[derive(Debug)]
enum MappingState {
    ExpectKey,
    ExpectValue(KeyToken),
    /// The key was not a scalar; its value is ignored.
    SkipValue,
}

#[derive(Debug)]
struct MappingFrame {
    state: MappingState,
    /// True if this mapping pushed a segment onto the key path.
    owns_segment: bool,
}

struct FlatteningReceiver<'a> {
    content: &'a str,
    /// Byte offset of every char, plus the content length.
    char_offsets: Vec<usize>,
    stack: Vec<MappingFrame>,
    path: Vec<String>,
    /// Depth of nested collections being ignored.
    skip_depth: usize,
    entries: Vec<RawEntry>,
}

impl<'a> FlatteningReceiver<'a> {
    fn new(content: &'a str) -> Self {
        let mut char_offsets: Vec<usize> = content.char_indices().map(|(i, _)| i).collect();
        char_offsets.push(content.len());
        Self {
            content,
            char_offsets,
            stack: Vec::new(),
            path: Vec::new(),
            skip_depth: 0,
            entries: Vec::new(),
        }
    }

    fn byte_offset(&self, mark: &Marker) -> usize {
        self.char_offsets
            .get(mark.index())
            .copied()
            .unwrap_or(self.content.len())
    }

    /// Byte length of the key token starting at `offset`.
    fn token_length(&self, offset: usize, text: &str, style: TScalarStyle) -> usize {
        let rest = &self.content[offset..];
        match style {
            TScalarStyle::SingleQuoted => quoted_length(rest, '\''),
            TScalarStyle::DoubleQuoted => quoted_length(rest, '"'),
            _ => text.len().min(rest.len()),
        }
    }

    /// Enter a collection that is not tracked, adjusting the parent mapping.
    fn start_skip(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.state = match frame.state {
                MappingState::ExpectKey => MappingState::SkipValue,
                _ => MappingState::ExpectKey,
            };
        }
        self.skip_depth = 1;
    }

    fn on_mapping_start(&mut self) {
        let Some(frame) = self.stack.last_mut() else {
            self.stack.push(MappingFrame {
                state: MappingState::ExpectKey,
                owns_segment: false,
            });
            return;
        };

        match std::mem::replace(&mut frame.state, MappingState::ExpectKey) {
            MappingState::ExpectValue(key) => {
                self.path.push(key.text);
                self.stack.push(MappingFrame {
                    state: MappingState::ExpectKey,
                    owns_segment: true,
                });
            }
            state => {
                frame.state = state;
                self.start_skip();
            }
        }
    }

    fn on_scalar(&mut self, text: String, style: TScalarStyle, mark: &Marker) {
        let offset = self.byte_offset(mark);
        let length = self.token_length(offset, &text, style);

        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        match std::mem::replace(&mut frame.state, MappingState::ExpectKey) {
            MappingState::ExpectKey => {
                frame.state = MappingState::ExpectValue(KeyToken {
                    text,
                    offset,
                    length,
                });
            }
            MappingState::ExpectValue(key) => {
                if is_string_scalar(&text, style) {
                    let parent = self.path.join(".");
                    self.entries.push(RawEntry {
                        key: join_key(&parent, &key.text),
                        segment: key.text,
                        value: text,
                        offset: key.offset,
                        length: key.length,
                    });
                }
            }
            MappingState::SkipValue => {}
        }
    }

    fn on_alias(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            frame.state = match frame.state {
                MappingState::ExpectKey => MappingState::SkipValue,
                _ => MappingState::ExpectKey,
            };
        }
    }

    fn on_mapping_end(&mut self) {
        if let Some(frame) = self.stack.pop()
            && frame.owns_segment
        {
            self.path.pop();
        }
    }
}

impl MarkedEventReceiver for FlatteningReceiver<'_> {
    fn on_event(&mut self, event: Event, mark: Marker) {
        if self.skip_depth > 0 {
            match event {
                Event::MappingStart(..) | Event::SequenceStart(..) => self.skip_depth += 1,
                Event::MappingEnd | Event::SequenceEnd => self.skip_depth -= 1,
                _ => {}
            }
            return;
        }

        match event {
            Event::MappingStart(..) => self.on_mapping_start(),
            Event::MappingEnd => self.on_mapping_end(),
            Event::SequenceStart(..) => self.start_skip(),
            Event::Scalar(text, style, ..) => self.on_scalar(text, style, &mark),
            Event::Alias(..) => self.on_alias(),
            Event::DocumentStart | Event::DocumentEnd => {
                self.stack.clear();
                self.path.clear();
            }
            _ => {}
        }
    }
}

/// Plain scalars count as strings only when YAML would not read them as numbers,
/// booleans or null.
fn is_string_scalar(text: &str, style: TScalarStyle) -> bool {
    match style {
        TScalarStyle::Plain => matches!(Yaml::from_str(text), Yaml::String(_)),
        _ => true,
    }
}

/// Byte length of a quoted scalar starting with `quote`, quotes included.
fn quoted_length(source: &str, quote: char) -> usize {
    let mut chars = source.char_indices().skip(1).peekable();
    while let Some((index, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
            continue;
        }
        if c == quote {
            if quote == '\'' && chars.peek().is_some_and(|(_, next)| *next == '\'') {
                chars.next();
                continue;
            }
            return index + c.len_utf8();
        }
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::parsers::yaml::*;

    fn pairs(content: &str) -> Vec<(String, String)> {
        parse(content)
            .unwrap()
            .into_iter()
            .map(|e| (e.key, e.value))
            .collect()
    }

    #[test]
    fn test_nested_mappings() {
        let content = "common:\n  hello: Hello\n  nested:\n    deep: Deep\nroot: Root\n";
        assert_eq!(
            pairs(content),
            vec![
                ("common.hello".into(), "Hello".into()),
                ("common.nested.deep".into(), "Deep".into()),
                ("root".into(), "Root".into()),
            ]
        );
    }

    #[test]
    fn test_quoted_values_and_keys() {
        let content = "hello: 'Hello'\n\"greet user\": \"Hi \\\"you\\\"\"\n";
        let entries = parse(content).unwrap();
        assert_eq!(entries[0].value, "Hello");
        assert_eq!(entries[1].key, "greet user");
        assert_eq!(entries[1].value, "Hi \"you\"");
        assert_eq!(
            &content[entries[1].offset..entries[1].offset + entries[1].length],
            "\"greet user\""
        );
    }

    #[test]
    fn test_exact_offsets() {
        let content = "# header\nauth:\n  login:\n    title: Sign in\n  logout: Bye\n";
        let entries = parse(content).unwrap();
        for entry in &entries {
            assert_eq!(
                &content[entry.offset..entry.offset + entry.length],
                entry.segment
            );
        }
        assert_eq!(entries[0].offset, content.find("title").unwrap());
    }

    #[test]
    fn test_multibyte_offsets() {
        let content = "标题: 你好\nnext: x\n";
        let entries = parse(content).unwrap();
        assert_eq!(&content[entries[1].offset..entries[1].offset + 4], "next");
    }

    #[test]
    fn test_non_strings_and_sequences_skipped() {
        let content = "count: 3\nflag: true\nnone: ~\nempty:\nlist:\n  - a\n  - b\nquoted_num: '3'\nafter: ok\n";
        assert_eq!(
            pairs(content),
            vec![
                ("quoted_num".into(), "3".into()),
                ("after".into(), "ok".into()),
            ]
        );
    }

    #[test]
    fn test_flow_mapping_and_block_scalar() {
        let content = "inline: { a: A, b: B }\ntext: |\n  line one\n  line two\n";
        assert_eq!(
            pairs(content),
            vec![
                ("inline.a".into(), "A".into()),
                ("inline.b".into(), "B".into()),
                ("text".into(), "line one\nline two\n".into()),
            ]
        );
    }

    #[test]
    fn test_sequence_of_mappings_is_skipped() {
        let content = "items:\n  - name: x\n    label: y\nnext: z\n";
        assert_eq!(pairs(content), vec![("next".into(), "z".into())]);
    }

    #[test]
    fn test_multi_document() {
        let content = "---\na: A\n---\nb: B\n";
        assert_eq!(
            pairs(content),
            vec![("a".into(), "A".into()), ("b".into(), "B".into())]
        );
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(parse("a: [unclosed\n").is_err());
    }

    #[test]
    fn test_quoted_length() {
        assert_eq!(quoted_length("'it''s' rest", '\''), 7);
        assert_eq!(quoted_length("\"a\\\"b\": x", '"'), 6);
    }
}

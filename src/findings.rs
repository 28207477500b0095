//! Findings reported by `keyscope check`.
//!
//! Each finding is self-contained: it carries everything the reporter needs to print
//! a cargo-style diagnostic without going back to the index.

use std::{
    collections::{BTreeMap, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
};

use enum_dispatch::enum_dispatch;

use crate::core::{
    index::CacheSnapshot,
    locale::normalize_locale,
    parsers::{build_line_index, offset_to_line},
};

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    MissingTranslation,
    ParseError,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::MissingTranslation => write!(f, "missing-translation"),
            Rule::ParseError => write!(f, "parse-error"),
        }
    }
}

/// A key defined in some locales but not in others.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTranslationFinding {
    pub key: String,
    /// Path of the entry the finding points at, relative to the project root.
    pub file: String,
    pub line: usize,
    /// 1-based column of the key token.
    pub col: usize,
    pub source_line: Option<String>,
    /// Display spellings of the locales without the key.
    pub missing_locales: Vec<String>,
}

/// A translation file that could not be read or parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorFinding {
    pub file: String,
    pub message: String,
}

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    MissingTranslation(MissingTranslationFinding),
    ParseError(ParseErrorFinding),
}

impl Finding {
    pub fn severity(&self) -> Severity {
        self.report_severity()
    }

    pub fn rule(&self) -> Rule {
        self.report_rule()
    }
}

/// Location information for report output.
pub struct FindingLocation<'a> {
    pub file: &'a str,
    /// 0 for file-level findings.
    pub line: usize,
    pub col: usize,
    pub source_line: Option<&'a str>,
}

#[enum_dispatch]
pub trait Report {
    fn location(&self) -> FindingLocation<'_>;

    /// Primary message (the key, or the file that failed).
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional text for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

impl Report for MissingTranslationFinding {
    fn location(&self) -> FindingLocation<'_> {
        FindingLocation {
            file: &self.file,
            line: self.line,
            col: self.col,
            source_line: self.source_line.as_deref(),
        }
    }

    fn message(&self) -> String {
        self.key.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Warning
    }

    fn report_rule(&self) -> Rule {
        Rule::MissingTranslation
    }

    fn details(&self) -> Option<String> {
        Some(format!("missing in: {}", self.missing_locales.join(", ")))
    }
}

impl Report for ParseErrorFinding {
    fn location(&self) -> FindingLocation<'_> {
        FindingLocation {
            file: &self.file,
            line: 0,
            col: 0,
            source_line: None,
        }
    }

    fn message(&self) -> String {
        self.file.clone()
    }

    fn report_severity(&self) -> Severity {
        Severity::Error
    }

    fn report_rule(&self) -> Rule {
        Rule::ParseError
    }

    fn details(&self) -> Option<String> {
        Some(self.message.clone())
    }
}

/// Findings of one snapshot, sorted by file and line.
pub fn collect_findings(snapshot: &CacheSnapshot, root: &Path) -> Vec<Finding> {
    let mut findings: Vec<Finding> = snapshot
        .parse_failures()
        .iter()
        .map(|failure| {
            Finding::ParseError(ParseErrorFinding {
                file: relative(failure.file.path(), root),
                message: failure.message.clone(),
            })
        })
        .collect();
    findings.extend(missing_translations(snapshot, root).into_iter().map(Finding::from));

    findings.sort_by(|a, b| {
        let (a, b) = (a.location(), b.location());
        a.file
            .cmp(b.file)
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.col.cmp(&b.col))
    });
    findings
}

fn missing_translations(snapshot: &CacheSnapshot, root: &Path) -> Vec<MissingTranslationFinding> {
    let locales: BTreeMap<String, String> = snapshot
        .available_locales()
        .into_iter()
        .map(|display| (normalize_locale(&display), display))
        .collect();
    if locales.len() < 2 {
        return Vec::new();
    }

    let mut sources = SourceCache::default();
    let mut findings = Vec::new();
    for key in snapshot.all_keys() {
        let present = snapshot.get_all_translations(&key);
        let missing_locales: Vec<String> = locales
            .iter()
            .filter(|(normalized, _)| !present.contains_key(*normalized))
            .map(|(_, display)| display.clone())
            .collect();
        if missing_locales.is_empty() {
            continue;
        }
        let anchor = snapshot
            .get_translation_strict(&key, snapshot.default_locale())
            .or_else(|| present.values().next());
        let Some(anchor) = anchor else {
            continue;
        };

        let path = anchor.file.path();
        let (line, col, source_line) = sources.position(path, anchor.offset, anchor.line);
        findings.push(MissingTranslationFinding {
            key,
            file: relative(path, root),
            line,
            col,
            source_line,
            missing_locales,
        });
    }
    findings
}

/// File contents read at most once per collection.
#[derive(Default)]
struct SourceCache {
    files: HashMap<PathBuf, Option<String>>,
}

impl SourceCache {
    /// Line, column and text of the line holding `offset`. Falls back to the recorded
    /// line when the file cannot be read.
    fn position(&mut self, path: &Path, offset: usize, line: usize) -> (usize, usize, Option<String>) {
        let content = self
            .files
            .entry(path.to_path_buf())
            .or_insert_with(|| fs::read_to_string(path).ok());
        let Some(content) = content.as_deref() else {
            return (line, 1, None);
        };

        let index = build_line_index(content);
        let line = offset_to_line(&index, offset);
        let start = index.get(line - 1).copied().unwrap_or_default();
        let col = content
            .get(start..offset)
            .map_or(1, |prefix| prefix.chars().count() + 1);
        let text = content[start..]
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        (line, col, Some(text))
    }
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::core::index::TranslationIndex;
    use crate::findings::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn findings(root: &Path) -> Vec<Finding> {
        let index = TranslationIndex::builder(root).build();
        index.initialize();
        collect_findings(&index.snapshot(), root)
    }

    #[test]
    fn test_missing_translation_points_at_default_locale() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "locales/en.json", "{\n  \"a\": \"A\",\n  \"b\": \"B\"\n}\n");
        write(root, "locales/de.json", "{\n  \"a\": \"A\"\n}\n");

        let findings = findings(root);
        assert_eq!(
            findings,
            vec![Finding::MissingTranslation(MissingTranslationFinding {
                key: "b".to_string(),
                file: "locales/en.json".to_string(),
                line: 3,
                col: 3,
                source_line: Some("  \"b\": \"B\"".to_string()),
                missing_locales: vec!["de".to_string()],
            })]
        );
        assert_eq!(findings[0].severity(), Severity::Warning);
        assert_eq!(findings[0].details().unwrap(), "missing in: de");
    }

    #[test]
    fn test_parse_errors_are_findings() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "locales/en.json", "{\"a\": \"A\"}");
        write(root, "locales/fr.yaml", "a: [unclosed\n");

        let findings = findings(root);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule(), Rule::ParseError);
        assert_eq!(findings[0].location().file, "locales/fr.yaml");
        assert_eq!(findings[0].severity(), Severity::Error);
    }

    #[test]
    fn test_single_locale_has_no_missing_translations() {
        let dir = tempdir().unwrap();
        write(dir.path(), "locales/en.json", "{\"a\": \"A\"}");
        assert!(findings(dir.path()).is_empty());
    }
}

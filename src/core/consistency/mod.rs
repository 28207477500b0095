//! Mutations that keep locales consistent: creating missing entries and renaming keys
//! across every locale file and call site.
//!
//! File edits are computed by an [`EditCapability`], written while the index holds its
//! build lock, and followed by one synchronous rebuild.

use std::{collections::BTreeSet, fs, path::Path, sync::Arc};

use anyhow::{Context, Result};

use crate::core::{
    data::{TranslationEntry, TranslationFile},
    index::{CacheSnapshot, TranslationIndex},
    locale::normalize_locale,
};

pub mod edit;
mod rename;

pub use edit::{EditCapability, FormatEditor};
pub use rename::{BlockReason, RenameOutcome, RenamePlan};

pub struct ConsistencyEngine {
    index: TranslationIndex,
    editor: Box<dyn EditCapability>,
}

impl ConsistencyEngine {
    pub fn new(index: TranslationIndex) -> Self {
        Self::with_editor(index, FormatEditor)
    }

    pub fn with_editor(index: TranslationIndex, editor: impl EditCapability + 'static) -> Self {
        Self {
            index,
            editor: Box::new(editor),
        }
    }

    pub fn index(&self) -> &TranslationIndex {
        &self.index
    }

    /// The key defined by the token at `offset` in `file`, if any.
    pub fn key_at(&self, file: &Path, offset: usize) -> Option<String> {
        let snapshot = self.index.snapshot();
        snapshot
            .file(file)?
            .entries
            .values()
            .find(|entry| entry.offset <= offset && offset <= entry.offset + entry.length)
            .map(|entry| entry.key.clone())
    }

    /// For each locale without `key`, the file that should receive it.
    pub fn collect_missing_targets(
        &self,
        key: &str,
        locales: &[String],
    ) -> Vec<(String, Arc<TranslationFile>)> {
        missing_targets(&self.index.snapshot(), key, locales)
    }

    /// Create `key` for `locale` with `value` unless it exists.
    ///
    /// Returns the entry visible after the rebuild, or `None` when no target file
    /// exists or the edit failed.
    pub fn create_missing_translation(
        &self,
        key: &str,
        locale: &str,
        value: &str,
    ) -> Option<Arc<TranslationEntry>> {
        let snapshot = self.index.snapshot();
        if let Some(existing) = snapshot.get_translation_strict(key, locale) {
            return Some(Arc::clone(existing));
        }
        let (_, target) = missing_targets(&snapshot, key, &[locale.to_string()])
            .into_iter()
            .next()?;

        if let Err(e) = self.index.with_build_lock(|| self.insert_into(&target, key, value)) {
            tracing::warn!("{}: {:#}", target.file, e);
            return None;
        }
        self.index.rebuild_now();
        self.index
            .snapshot()
            .get_translation_strict(key, locale)
            .cloned()
    }

    /// Create `key` in every locale of `locales` that lacks it, with values from
    /// `value_for(locale)`. Rebuilds once and returns the number of entries created.
    pub fn fill_missing_translations(
        &self,
        key: &str,
        locales: &[String],
        value_for: impl Fn(&str) -> String,
    ) -> usize {
        let targets = missing_targets(&self.index.snapshot(), key, locales);
        if targets.is_empty() {
            return 0;
        }

        let written: Vec<&str> = self.index.with_build_lock(|| {
            targets
                .iter()
                .filter_map(|(locale, target)| {
                    match self.insert_into(target, key, &value_for(locale.as_str())) {
                        Ok(()) => Some(locale.as_str()),
                        Err(e) => {
                            tracing::warn!("{}: {:#}", target.file, e);
                            None
                        }
                    }
                })
                .collect()
        });
        if written.is_empty() {
            return 0;
        }

        self.index.rebuild_now();
        let snapshot = self.index.snapshot();
        written
            .into_iter()
            .filter(|locale| snapshot.get_translation_strict(key, locale).is_some())
            .count()
    }

    /// Insert `key` into `target` on disk. Callers hold the build lock.
    fn insert_into(&self, target: &TranslationFile, key: &str, value: &str) -> Result<()> {
        let path = target.file.path();
        let relative = key
            .strip_prefix(target.key_prefix.as_str())
            .with_context(|| format!("'{}' does not start with '{}'", key, target.key_prefix))?;
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let updated = self
            .editor
            .insert(path, &content, target.format, relative, value)?;
        fs::write(path, updated).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("added '{}' to {}", key, path.display());
        Ok(())
    }
}

/// Target file per missing locale: files of that locale whose key prefix `key` starts
/// with; the longest prefix wins, then the lowest path. Locales without any such file
/// are skipped.
fn missing_targets(
    snapshot: &CacheSnapshot,
    key: &str,
    locales: &[String],
) -> Vec<(String, Arc<TranslationFile>)> {
    let present = snapshot.get_all_translations(key);
    let mut seen = BTreeSet::new();

    locales
        .iter()
        .filter_map(|locale| {
            let normalized = normalize_locale(locale);
            if present.contains_key(&normalized) || !seen.insert(normalized.clone()) {
                return None;
            }
            let target = snapshot
                .files()
                .iter()
                .filter(|file| file.has_locale() && file.normalized_locale() == normalized)
                .filter(|file| key.len() > file.key_prefix.len() && key.starts_with(&file.key_prefix))
                .min_by(|a, b| {
                    b.key_prefix
                        .len()
                        .cmp(&a.key_prefix.len())
                        .then_with(|| a.file.cmp(&b.file))
                })?;
            Some((locale.clone(), Arc::clone(target)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use crate::core::consistency::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn engine(root: &Path) -> ConsistencyEngine {
        let index = TranslationIndex::builder(root).build();
        index.initialize();
        ConsistencyEngine::new(index)
    }

    fn locales(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_targets_prefer_longest_prefix_then_path() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "locales/en/common.json", r#"{"hello": "Hello"}"#);
        write(root, "locales/de/common.json", r#"{"other": "x"}"#);
        write(root, "locales/de/errors.json", r#"{"x": "y"}"#);
        write(root, "locales/de.json", r#"{"top": "t"}"#);
        write(root, "locales/fr.json", r#"{"top": "t"}"#);

        let engine = engine(root);
        let targets = engine.collect_missing_targets("common.hello", &locales(&["en", "de", "fr", "it"]));
        let summary: Vec<(String, String)> = targets
            .iter()
            .map(|(locale, file)| {
                let path = file.file.path().strip_prefix(root).unwrap();
                (locale.clone(), path.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("de".to_string(), "locales/de/common.json".to_string()),
                ("fr".to_string(), "locales/fr.json".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_locale_spellings_are_targeted_once() {
        let dir = tempdir().unwrap();
        write(dir.path(), "locales/zh-CN.json", r#"{"a": "A"}"#);
        write(dir.path(), "locales/en.json", r#"{"b": "B"}"#);

        let engine = engine(dir.path());
        let targets = engine.collect_missing_targets("b", &locales(&["zh-CN", "zh_CN"]));
        assert_eq!(targets.len(), 1);
    }

    #[test]
    fn test_create_is_idempotent() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "locales/en.json", r#"{"greet": "Hi"}"#);
        write(root, "locales/de.yaml", "other: Anders\n");

        let engine = engine(root);
        let first = engine.create_missing_translation("greet", "de", "Hallo").unwrap();
        assert_eq!(first.value, "Hallo");
        let content = fs::read_to_string(root.join("locales/de.yaml")).unwrap();

        let second = engine.create_missing_translation("greet", "de", "Servus").unwrap();
        assert_eq!(second, first);
        assert_eq!(second.value, "Hallo");
        assert_eq!(fs::read_to_string(root.join("locales/de.yaml")).unwrap(), content);
    }

    #[test]
    fn test_create_without_target_file() {
        let dir = tempdir().unwrap();
        write(dir.path(), "locales/en.json", r#"{"greet": "Hi"}"#);
        let engine = engine(dir.path());
        assert!(engine.create_missing_translation("greet", "fr", "Salut").is_none());
    }

    #[test]
    fn test_fill_counts_created_entries() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        write(root, "locales/en.json", r#"{"nav": {"home": "Home"}}"#);
        write(root, "locales/de.properties", "x=y\n");
        write(root, "locales/es.toml", "x = \"y\"\n");

        let engine = engine(root);
        let before = engine.index().published_count();
        let created = engine.fill_missing_translations(
            "nav.home",
            &locales(&["en", "de", "es", "fr"]),
            |locale| format!("home-{}", locale),
        );
        assert_eq!(created, 2);
        assert_eq!(engine.index().published_count(), before + 1);

        let snapshot = engine.index().snapshot();
        assert_eq!(snapshot.get_translation_strict("nav.home", "de").unwrap().value, "home-de");
        assert_eq!(snapshot.get_translation_strict("nav.home", "es").unwrap().value, "home-es");
        assert_eq!(snapshot.get_translation_strict("nav.home", "en").unwrap().value, "Home");
    }

    #[test]
    fn test_key_at_offset() {
        let dir = tempdir().unwrap();
        let content = "{\n  \"title\": \"T\"\n}\n";
        write(dir.path(), "locales/en.json", content);
        let engine = engine(dir.path());
        let path = dir.path().join("locales/en.json");
        let offset = content.find("title").unwrap();
        assert_eq!(engine.key_at(&path, offset).as_deref(), Some("title"));
        assert_eq!(engine.key_at(&path, content.len() - 2), None);
    }
}

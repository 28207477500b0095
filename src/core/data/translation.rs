use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use super::{FileRef, Framework, TranslationEntry};
use crate::core::{
    locale::{UNKNOWN_LOCALE, normalize_locale},
    parsers::Format,
};

/// One parsed translation file. Holds a single locale, so entries are keyed by key only.
#[derive(Debug, Clone)]
pub struct TranslationFile {
    pub file: FileRef,
    pub format: Format,
    /// Locale as spelled in the path.
    pub locale: String,
    pub module: Option<String>,
    pub business_unit: Option<String>,
    /// Prefix prepended to every key of the file. Empty or ends with `.`.
    pub key_prefix: String,
    pub entries: HashMap<String, Arc<TranslationEntry>>,
}

impl TranslationFile {
    pub fn normalized_locale(&self) -> String {
        normalize_locale(&self.locale)
    }

    pub fn has_locale(&self) -> bool {
        self.locale != UNKNOWN_LOCALE
    }
}

/// The full corpus of one project state.
#[derive(Debug, Clone, Default)]
pub struct TranslationData {
    /// Files sorted by path.
    pub files: Vec<Arc<TranslationFile>>,
    /// `key -> normalized locale -> entry`.
    pub translations: HashMap<String, BTreeMap<String, Arc<TranslationEntry>>>,
    pub framework: Framework,
}

impl TranslationData {
    /// Assemble the key/locale view from parsed files.
    ///
    /// Files are taken in path order; when two files of the same locale define the same
    /// key, the first one wins.
    pub fn from_files(mut files: Vec<Arc<TranslationFile>>, framework: Framework) -> Self {
        files.sort_by(|a, b| a.file.cmp(&b.file));

        let mut translations: HashMap<String, BTreeMap<String, Arc<TranslationEntry>>> =
            HashMap::new();
        for file in &files {
            let locale = file.normalized_locale();
            for (key, entry) in &file.entries {
                translations
                    .entry(key.clone())
                    .or_default()
                    .entry(locale.clone())
                    .or_insert_with(|| Arc::clone(entry));
            }
        }

        Self {
            files,
            translations,
            framework,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Normalized locales of all files with a recognized locale.
    pub fn locales(&self) -> BTreeSet<String> {
        self.files
            .iter()
            .filter(|f| f.has_locale())
            .map(|f| f.normalized_locale())
            .collect()
    }

    pub fn entry_count(&self) -> usize {
        self.files.iter().map(|f| f.entries.len()).sum()
    }
}

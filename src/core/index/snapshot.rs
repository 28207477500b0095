//! One immutable generation of the index and every read query on it.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    path::Path,
    sync::{Arc, LazyLock},
};

use crate::core::{
    data::{FileRef, Framework, TranslationData, TranslationEntry, TranslationFile},
    locale::{build_locale_candidates, choose_display_locale, normalize_locale},
};

/// A translation file that could not be read or parsed during a rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub file: FileRef,
    pub message: String,
}

static EMPTY: LazyLock<Arc<CacheSnapshot>> = LazyLock::new(|| Arc::new(CacheSnapshot::default()));

/// All translation data of one project state, with its lookup indexes.
///
/// Built in one piece by the builder and never modified afterwards.
#[derive(Debug, Default)]
pub struct CacheSnapshot {
    data: TranslationData,
    /// `key -> every entry of the key`, across locales and files.
    by_key: HashMap<String, Vec<Arc<TranslationEntry>>>,
    by_file: HashMap<FileRef, Arc<TranslationFile>>,
    modules: HashMap<String, TranslationData>,
    module_dependencies: HashMap<String, Vec<String>>,
    parse_failures: Vec<ParseFailure>,
    default_locale: String,
    generation: u64,
}

impl CacheSnapshot {
    /// The resting state before initialization and after disposal.
    pub fn empty() -> Arc<Self> {
        Arc::clone(&EMPTY)
    }

    pub(crate) fn assemble(
        data: TranslationData,
        module_dependencies: HashMap<String, Vec<String>>,
        parse_failures: Vec<ParseFailure>,
        default_locale: &str,
        generation: u64,
    ) -> Self {
        let mut by_key: HashMap<String, Vec<Arc<TranslationEntry>>> = HashMap::new();
        let mut by_file = HashMap::with_capacity(data.files.len());
        let mut module_files: BTreeMap<String, Vec<Arc<TranslationFile>>> = BTreeMap::new();

        for file in &data.files {
            for (key, entry) in &file.entries {
                by_key.entry(key.clone()).or_default().push(Arc::clone(entry));
            }
            by_file.insert(file.file.clone(), Arc::clone(file));
            if let Some(module) = &file.module {
                module_files
                    .entry(module.clone())
                    .or_default()
                    .push(Arc::clone(file));
            }
        }
        for entries in by_key.values_mut() {
            entries.sort_by(|a, b| (&a.locale, &a.file).cmp(&(&b.locale, &b.file)));
        }

        let modules = module_files
            .into_iter()
            .map(|(module, files)| (module, TranslationData::from_files(files, data.framework)))
            .collect();

        Self {
            data,
            by_key,
            by_file,
            modules,
            module_dependencies,
            parse_failures,
            default_locale: default_locale.to_string(),
            generation,
        }
    }

    pub fn data(&self) -> &TranslationData {
        &self.data
    }

    pub fn framework(&self) -> Framework {
        self.data.framework
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn parse_failures(&self) -> &[ParseFailure] {
        &self.parse_failures
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Lookup order for `locale`: its fallback chain, then the default locale's.
    pub fn locale_candidates(&self, locale: &str) -> Vec<String> {
        let mut candidates = build_locale_candidates(locale);
        for fallback in build_locale_candidates(&self.default_locale) {
            if !candidates.contains(&fallback) {
                candidates.push(fallback);
            }
        }
        candidates
    }

    /// Entry of `key` for `locale`, falling back through [`locale_candidates`].
    ///
    /// [`locale_candidates`]: Self::locale_candidates
    pub fn get_translation(&self, key: &str, locale: &str) -> Option<&Arc<TranslationEntry>> {
        lookup(&self.data, key, &self.locale_candidates(locale))
    }

    /// Entry of `key` for exactly `locale`.
    pub fn get_translation_strict(
        &self,
        key: &str,
        locale: &str,
    ) -> Option<&Arc<TranslationEntry>> {
        self.data
            .translations
            .get(key)?
            .get(&normalize_locale(locale))
    }

    /// `normalized locale -> entry` for `key`.
    pub fn get_all_translations(&self, key: &str) -> BTreeMap<String, Arc<TranslationEntry>> {
        self.data.translations.get(key).cloned().unwrap_or_default()
    }

    /// Every entry defining `key`, including ones hidden by an earlier file of the
    /// same locale.
    pub fn get_entries(&self, key: &str) -> &[Arc<TranslationEntry>] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// All known keys, sorted.
    pub fn all_keys(&self) -> Vec<String> {
        sorted_keys(&self.data)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .data
            .translations
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Parsed files, sorted by path.
    pub fn files(&self) -> &[Arc<TranslationFile>] {
        &self.data.files
    }

    pub fn file(&self, path: &Path) -> Option<&Arc<TranslationFile>> {
        self.by_file.get(&FileRef::new(path))
    }

    /// Entries of `key` in every locale other than that of `file`.
    pub fn sibling_entries(&self, file: &Path, key: &str) -> Vec<Arc<TranslationEntry>> {
        let Some(own) = self.file(file) else {
            return Vec::new();
        };
        let own_locale = own.normalized_locale();
        self.data
            .translations
            .get(key)
            .map(|locales| {
                locales
                    .iter()
                    .filter(|(locale, _)| **locale != own_locale)
                    .map(|(_, entry)| Arc::clone(entry))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One display spelling per locale present, ordered by normalized locale.
    pub fn available_locales(&self) -> Vec<String> {
        let mut spellings: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
        for file in self.data.files.iter().filter(|f| f.has_locale()) {
            spellings
                .entry(file.normalized_locale())
                .or_default()
                .insert(file.locale.as_str());
        }
        spellings
            .values()
            .filter_map(|variants| {
                let variants: Vec<&str> = variants.iter().copied().collect();
                choose_display_locale(&variants)
            })
            .collect()
    }

    /// Modules with at least one translation file, sorted.
    pub fn module_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn module_dependencies(&self, module: &str) -> &[String] {
        self.module_dependencies
            .get(module)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Partitions searched for `module`: the module itself, then its dependencies in
    /// declared order.
    fn module_chain(&self, module: &str) -> Vec<&TranslationData> {
        let mut names = vec![module];
        for dependency in self.module_dependencies(module) {
            if !names.contains(&dependency.as_str()) {
                names.push(dependency);
            }
        }
        names
            .into_iter()
            .filter_map(|name| self.modules.get(name))
            .collect()
    }

    /// [`get_translation`](Self::get_translation) within `module` and its dependencies,
    /// or globally when none of them has the key.
    pub fn get_translation_for_module(
        &self,
        module: &str,
        key: &str,
        locale: &str,
    ) -> Option<&Arc<TranslationEntry>> {
        let candidates = self.locale_candidates(locale);
        self.module_chain(module)
            .into_iter()
            .find_map(|data| lookup(data, key, &candidates))
            .or_else(|| self.get_translation(key, locale))
    }

    /// [`get_all_translations`](Self::get_all_translations) within `module` and its
    /// dependencies. The module wins over its dependencies for a locale.
    pub fn get_all_translations_for_module(
        &self,
        module: &str,
        key: &str,
    ) -> BTreeMap<String, Arc<TranslationEntry>> {
        let mut merged: BTreeMap<String, Arc<TranslationEntry>> = BTreeMap::new();
        for data in self.module_chain(module) {
            if let Some(locales) = data.translations.get(key) {
                for (locale, entry) in locales {
                    merged
                        .entry(locale.clone())
                        .or_insert_with(|| Arc::clone(entry));
                }
            }
        }
        if merged.is_empty() {
            return self.get_all_translations(key);
        }
        merged
    }

    /// Keys visible from `module`, sorted.
    pub fn all_keys_for_module(&self, module: &str) -> Vec<String> {
        let keys: BTreeSet<String> = self
            .module_chain(module)
            .into_iter()
            .flat_map(|data| data.translations.keys().cloned())
            .collect();
        if keys.is_empty() {
            return self.all_keys();
        }
        keys.into_iter().collect()
    }
}

fn lookup<'d>(
    data: &'d TranslationData,
    key: &str,
    candidates: &[String],
) -> Option<&'d Arc<TranslationEntry>> {
    let locales = data.translations.get(key)?;
    candidates.iter().find_map(|locale| locales.get(locale))
}

fn sorted_keys(data: &TranslationData) -> Vec<String> {
    let mut keys: Vec<String> = data.translations.keys().cloned().collect();
    keys.sort();
    keys
}

//! Project traversal: translation files inside i18n directories, and source files
//! outside them.

use std::{
    collections::HashSet,
    path::{Component, Path, PathBuf},
};

use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::config::Config;
use crate::core::{parsers::Format, path_decoder::PathDecoder};

/// Build output and dependency directories never descended into.
pub const BUILTIN_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "target",
    "build",
    "dist",
    "out",
    "bin",
    "obj",
    "vendor",
    "coverage",
    "__pycache__",
    "bower_components",
];

/// Result of scanning files.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Matched files, sorted by path.
    pub files: Vec<PathBuf>,
    /// Entries that could not be read.
    pub skipped_count: usize,
}

pub struct TranslationScanner {
    root: PathBuf,
    decoder: PathDecoder,
    excluded_dirs: HashSet<String>,
    ignores: Vec<Pattern>,
    source_extensions: Vec<String>,
}

impl TranslationScanner {
    pub fn new(root: &Path, config: &Config) -> Self {
        let excluded_dirs = BUILTIN_EXCLUDED_DIRS
            .iter()
            .map(|d| d.to_string())
            .chain(config.exclude_dirs.iter().map(|d| d.to_ascii_lowercase()))
            .collect();

        Self {
            root: root.to_path_buf(),
            decoder: PathDecoder::new(&config.i18n_dirs),
            excluded_dirs,
            ignores: config.ignore_patterns(),
            source_extensions: config
                .source_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn decoder(&self) -> &PathDecoder {
        &self.decoder
    }

    /// All translation files below the root.
    pub fn scan(&self) -> ScanResult {
        self.walk(|path| self.is_translation_file(path), false)
    }

    /// Source files outside i18n directories, for call-site scanning.
    pub fn scan_sources(&self) -> ScanResult {
        self.walk(|path| self.is_source_file(path), true)
    }

    /// Returns true if `path` is a file [`scan`](Self::scan) collects.
    ///
    /// Needs no file system access, so it also classifies deleted files.
    pub fn is_translation_file(&self, path: &Path) -> bool {
        let Some(dirs) = self.relative_dirs(path) else {
            return false;
        };
        Format::from_path(path).is_some()
            && !dirs.iter().any(|d| self.is_pruned_dir(d))
            && dirs.iter().any(|d| self.decoder.is_i18n_dir(d))
            && !self.is_ignored(path)
    }

    fn is_source_file(&self, path: &Path) -> bool {
        let Some(dirs) = self.relative_dirs(path) else {
            return false;
        };
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        extension.is_some_and(|e| self.source_extensions.contains(&e))
            && !dirs
                .iter()
                .any(|d| self.is_pruned_dir(d) || self.decoder.is_i18n_dir(d))
            && !self.is_ignored(path)
    }

    fn walk(&self, accept: impl Fn(&Path) -> bool, skip_i18n_dirs: bool) -> ScanResult {
        let mut result = ScanResult::default();

        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.should_descend(entry, skip_i18n_dirs));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    result.skipped_count += 1;
                    tracing::debug!("cannot access path: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && accept(entry.path()) {
                result.files.push(entry.into_path());
            }
        }

        result.files.sort();
        result
    }

    fn should_descend(&self, entry: &DirEntry, skip_i18n_dirs: bool) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        let Some(name) = entry.file_name().to_str() else {
            return false;
        };
        !(self.is_pruned_dir(name) || (skip_i18n_dirs && self.decoder.is_i18n_dir(name)))
    }

    fn is_pruned_dir(&self, name: &str) -> bool {
        name.starts_with('.') || self.excluded_dirs.contains(&name.to_ascii_lowercase())
    }

    fn is_ignored(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        self.ignores.iter().any(|p| p.matches_path(relative))
    }

    /// Directory names between the root and `path`, or `None` if `path` is outside it.
    fn relative_dirs<'p>(&self, path: &'p Path) -> Option<Vec<&'p str>> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut names: Vec<&str> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => s.to_str(),
                _ => None,
            })
            .collect();
        names.pop()?;
        Some(names)
    }
}

//! Renaming a key in every locale file and at every call site.
//!
//! A rename is planned first: every edited file is rendered in memory. Nothing is
//! written unless the whole plan renders, so a refused rename leaves all files
//! untouched.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt, fs,
    path::{Path, PathBuf},
};

use super::ConsistencyEngine;
use crate::core::{
    consistency::edit::splice,
    data::FileRef,
    namespace::KeyUsage,
};

/// Why a rename was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// The new key already has entries in these locales.
    TargetExists { locales: Vec<String> },
    SameKey,
    UnknownKey,
    /// The file's key prefix cannot express the new key.
    PrefixMismatch { file: PathBuf },
    EditFailed { file: PathBuf, message: String },
    /// A call site resolving to the old key cannot be rewritten under its namespace.
    UsageOutsideNamespace { file: PathBuf, line: usize },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::TargetExists { locales } => {
                write!(f, "the new key already exists in: {}", locales.join(", "))
            }
            BlockReason::SameKey => write!(f, "the old and new keys are the same"),
            BlockReason::UnknownKey => write!(f, "the key is not defined in any locale file"),
            BlockReason::PrefixMismatch { file } => write!(
                f,
                "{} only holds keys under its own prefix",
                file.display()
            ),
            BlockReason::EditFailed { file, message } => {
                write!(f, "cannot edit {}: {}", file.display(), message)
            }
            BlockReason::UsageOutsideNamespace { file, line } => write!(
                f,
                "the call at {}:{} cannot reach the new key from its namespace",
                file.display(),
                line
            ),
        }
    }
}

/// Result of [`ConsistencyEngine::rename`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { files: Vec<PathBuf>, usages: usize },
    Blocked(BlockReason),
}

/// A rename rendered in memory.
#[derive(Debug, Clone)]
pub struct RenamePlan {
    pub old_key: String,
    pub new_key: String,
    /// Translation files defining the old key.
    pub translation_files: Vec<PathBuf>,
    /// Call sites resolving to the old key.
    pub usages: Vec<KeyUsage>,
    edits: Vec<StagedEdit>,
}

impl RenamePlan {
    /// Every file the plan writes, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        self.edits.iter().map(|edit| edit.path.clone()).collect()
    }
}

#[derive(Debug, Clone)]
struct StagedEdit {
    path: PathBuf,
    original: String,
    updated: String,
}

impl ConsistencyEngine {
    /// Render the rename of `old_key` to `new_key` without writing anything.
    pub fn plan_rename(&self, old_key: &str, new_key: &str) -> Result<RenamePlan, BlockReason> {
        if old_key == new_key {
            return Err(BlockReason::SameKey);
        }
        let snapshot = self.index.snapshot();
        let entries = snapshot.get_entries(old_key);
        if entries.is_empty() {
            return Err(BlockReason::UnknownKey);
        }
        let existing = snapshot.get_entries(new_key);
        if !existing.is_empty() {
            let locales: BTreeSet<String> = existing.iter().map(|e| e.locale.clone()).collect();
            return Err(BlockReason::TargetExists {
                locales: locales.into_iter().collect(),
            });
        }

        let mut edits = BTreeMap::new();
        let files: BTreeSet<&FileRef> = entries.iter().map(|entry| &entry.file).collect();
        for file in &files {
            let path = file.path();
            let Some(translation) = snapshot.file(path) else {
                continue;
            };
            let prefix = translation.key_prefix.as_str();
            let (Some(old_relative), Some(new_relative)) =
                (old_key.strip_prefix(prefix), new_key.strip_prefix(prefix))
            else {
                return Err(BlockReason::PrefixMismatch {
                    file: path.to_path_buf(),
                });
            };
            if new_relative.is_empty() {
                return Err(BlockReason::PrefixMismatch {
                    file: path.to_path_buf(),
                });
            }

            let original = read(path)?;
            let updated = self
                .editor
                .rename(path, &original, translation.format, old_relative, new_relative)
                .map_err(|e| edit_failed(path, &e))?;
            edits.insert(
                path.to_path_buf(),
                StagedEdit {
                    path: path.to_path_buf(),
                    original,
                    updated,
                },
            );
        }

        let usages = self.index.find_usages(old_key);
        let mut by_source: BTreeMap<PathBuf, Vec<(&KeyUsage, String)>> = BTreeMap::new();
        for usage in &usages {
            let Some(rewritten) = usage.rewritten_key(old_key, new_key) else {
                return Err(BlockReason::UsageOutsideNamespace {
                    file: usage.file.path().to_path_buf(),
                    line: usage.line,
                });
            };
            by_source
                .entry(usage.file.path().to_path_buf())
                .or_default()
                .push((usage, rewritten));
        }
        for (path, mut rewrites) in by_source {
            let original = match edits.get(&path) {
                Some(staged) => staged.updated.clone(),
                None => read(&path)?,
            };
            rewrites.sort_by_key(|(usage, _)| std::cmp::Reverse(usage.offset));
            let mut updated = original.clone();
            for (usage, rewritten) in rewrites {
                updated = rewrite_literal(&updated, usage, &rewritten).ok_or_else(|| {
                    BlockReason::EditFailed {
                        file: path.clone(),
                        message: format!("line {} no longer holds the key literal", usage.line),
                    }
                })?;
            }
            match edits.get_mut(&path) {
                Some(staged) => staged.updated = updated,
                None => {
                    edits.insert(
                        path.clone(),
                        StagedEdit {
                            path,
                            original,
                            updated,
                        },
                    );
                }
            }
        }

        Ok(RenamePlan {
            old_key: old_key.to_string(),
            new_key: new_key.to_string(),
            translation_files: files.iter().map(|file| file.path().to_path_buf()).collect(),
            usages,
            edits: edits.into_values().collect(),
        })
    }

    /// Write a planned rename and rebuild.
    ///
    /// Files changed on disk since planning block the rename; a failed write restores
    /// the files already written.
    pub fn apply_rename(&self, plan: RenamePlan) -> RenameOutcome {
        let written = self.index.with_build_lock(|| write_all(&plan.edits));
        if let Err(reason) = written {
            tracing::warn!("rename of '{}' blocked: {}", plan.old_key, reason);
            return RenameOutcome::Blocked(reason);
        }
        self.index.rebuild_now();
        tracing::info!(
            "renamed '{}' to '{}' in {} files",
            plan.old_key,
            plan.new_key,
            plan.edits.len()
        );
        RenameOutcome::Renamed {
            files: plan.files(),
            usages: plan.usages.len(),
        }
    }

    /// Rename `old_key` to `new_key` in every locale file and call site, or nowhere.
    pub fn rename(&self, old_key: &str, new_key: &str) -> RenameOutcome {
        match self.plan_rename(old_key, new_key) {
            Ok(plan) => self.apply_rename(plan),
            Err(reason) => {
                tracing::debug!("rename of '{}' blocked: {}", old_key, reason);
                RenameOutcome::Blocked(reason)
            }
        }
    }
}

fn read(path: &Path) -> Result<String, BlockReason> {
    fs::read_to_string(path).map_err(|e| edit_failed(path, &e))
}

fn edit_failed(path: &Path, error: &dyn fmt::Display) -> BlockReason {
    BlockReason::EditFailed {
        file: path.to_path_buf(),
        message: format!("{:#}", error),
    }
}

fn write_all(edits: &[StagedEdit]) -> Result<(), BlockReason> {
    for edit in edits {
        if read(&edit.path)? != edit.original {
            return Err(BlockReason::EditFailed {
                file: edit.path.clone(),
                message: "the file changed since the rename was planned".to_string(),
            });
        }
    }
    for (index, edit) in edits.iter().enumerate() {
        if let Err(e) = fs::write(&edit.path, &edit.updated) {
            for done in &edits[..index] {
                if let Err(restore) = fs::write(&done.path, &done.original) {
                    tracing::warn!("failed to restore {}: {}", done.path.display(), restore);
                }
            }
            return Err(edit_failed(&edit.path, &e));
        }
    }
    Ok(())
}

/// Replace the key literal of `usage` in `content`, keeping its quote style.
fn rewrite_literal(content: &str, usage: &KeyUsage, key: &str) -> Option<String> {
    let literal = content.get(usage.offset..usage.offset + usage.length)?;
    let quote = literal.chars().next()?;
    if !matches!(quote, '"' | '\'' | '`') || !literal.ends_with(quote) || literal.len() < 2 {
        return None;
    }
    let mut replacement = String::with_capacity(key.len() + 2);
    replacement.push(quote);
    for c in key.chars() {
        match c {
            '\\' => replacement.push_str("\\\\"),
            '\n' => replacement.push_str("\\n"),
            c if c == quote => {
                replacement.push('\\');
                replacement.push(c);
            }
            '$' if quote == '`' => replacement.push_str("\\$"),
            c => replacement.push(c),
        }
    }
    replacement.push(quote);
    splice(content, usage.offset, usage.length, &replacement)
}

use std::{collections::BTreeMap, sync::Arc};

use anyhow::Result;
use colored::Colorize;

use super::{super::exit_status::ExitStatus, open_index, relative};
use crate::cli::{
    args::{GlobalArgs, ShowCommand},
    report::print_failure,
};
use crate::core::{data::TranslationEntry, index::CacheSnapshot};

pub fn show(global: &GlobalArgs, cmd: ShowCommand) -> Result<ExitStatus> {
    let index = open_index(global)?;
    let snapshot = index.snapshot();

    let entries = lookup(&snapshot, &cmd);
    if entries.is_empty() {
        let message = match cmd.locale.as_deref() {
            Some(locale) => format!("'{}' has no value for {}", cmd.key, locale),
            None => format!("'{}' is not defined", cmd.key),
        };
        print_failure(&message);
        return Ok(ExitStatus::Failure);
    }

    let width = entries.keys().map(String::len).max().unwrap_or_default();
    for (locale, entry) in &entries {
        println!(
            "{:<width$}  {}  {}",
            locale.bold(),
            entry.value,
            format!("{}:{}", relative(entry.file.path(), index.root()), entry.line).dimmed(),
            width = width
        );
    }
    Ok(ExitStatus::Success)
}

/// Requested locale (as asked) or every locale (normalized) to the entry shown for it.
fn lookup(snapshot: &CacheSnapshot, cmd: &ShowCommand) -> BTreeMap<String, Arc<TranslationEntry>> {
    let key = cmd.key.as_str();
    let module = cmd.module.as_deref();
    match cmd.locale.as_deref() {
        Some(locale) => {
            let entry = match (cmd.strict, module) {
                (true, _) => snapshot.get_translation_strict(key, locale),
                (false, Some(module)) => snapshot.get_translation_for_module(module, key, locale),
                (false, None) => snapshot.get_translation(key, locale),
            };
            entry
                .map(|entry| (locale.to_string(), Arc::clone(entry)))
                .into_iter()
                .collect()
        }
        None => match module {
            Some(module) => snapshot.get_all_translations_for_module(module, key),
            None => snapshot.get_all_translations(key),
        },
    }
}

use anyhow::Result;
use colored::Colorize;

use super::{super::exit_status::ExitStatus, open_index, relative};
use crate::cli::args::GlobalArgs;
use crate::core::locale::normalize_locale;

pub fn locales(global: &GlobalArgs) -> Result<ExitStatus> {
    let index = open_index(global)?;
    let snapshot = index.snapshot();
    let default = normalize_locale(snapshot.default_locale());

    for locale in snapshot.available_locales() {
        if normalize_locale(&locale) == default {
            println!("{} {}", locale, "(default)".dimmed());
        } else {
            println!("{}", locale);
        }
    }
    Ok(ExitStatus::Success)
}

pub fn files(global: &GlobalArgs) -> Result<ExitStatus> {
    let index = open_index(global)?;
    let snapshot = index.snapshot();

    for file in snapshot.files() {
        let mut line = format!(
            "{}  {}  {}  {} {}",
            relative(file.file.path(), index.root()),
            file.locale,
            file.format,
            file.entries.len(),
            if file.entries.len() == 1 { "key" } else { "keys" }
        );
        if !file.key_prefix.is_empty() {
            line.push_str(&format!("  prefix={}", file.key_prefix.trim_end_matches('.')));
        }
        if let Some(module) = file.module.as_deref() {
            line.push_str(&format!("  module={}", module));
        }
        println!("{}", line);
    }
    for failure in snapshot.parse_failures() {
        eprintln!(
            "{} {}: {}",
            "warning:".bold().yellow(),
            relative(failure.file.path(), index.root()),
            failure.message
        );
    }
    Ok(ExitStatus::Success)
}

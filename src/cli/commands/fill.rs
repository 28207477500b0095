use anyhow::Result;

use super::{super::exit_status::ExitStatus, open_index, relative};
use crate::cli::{
    args::{FillCommand, GlobalArgs},
    report::{plural, print_done, print_failure},
};
use crate::core::consistency::ConsistencyEngine;

pub fn fill(global: &GlobalArgs, cmd: FillCommand) -> Result<ExitStatus> {
    let index = open_index(global)?;
    let snapshot = index.snapshot();

    let value = cmd.value.unwrap_or_else(|| {
        snapshot
            .get_translation(&cmd.key, snapshot.default_locale())
            .map(|entry| entry.value.clone())
            .unwrap_or_default()
    });
    let locales = if cmd.locales.is_empty() {
        snapshot.available_locales()
    } else {
        cmd.locales
    };
    drop(snapshot);

    let engine = ConsistencyEngine::new(index);
    let targets = engine.collect_missing_targets(&cmd.key, &locales);
    if targets.is_empty() {
        print_done(&format!("'{}' is present in every locale", cmd.key));
        return Ok(ExitStatus::Success);
    }

    if !cmd.apply {
        for (locale, target) in &targets {
            println!(
                "would add '{}' to {} ({})",
                cmd.key,
                relative(target.file.path(), engine.index().root()),
                locale
            );
        }
        println!("Run with --apply to write the entries.");
        return Ok(ExitStatus::Success);
    }

    let created = engine.fill_missing_translations(&cmd.key, &locales, |_| value.clone());
    if created < targets.len() {
        print_failure(&format!(
            "added '{}' in {} of {} locales (run with -v for details)",
            cmd.key,
            created,
            targets.len()
        ));
        return Ok(ExitStatus::Failure);
    }
    print_done(&format!(
        "Added '{}' in {} {}",
        cmd.key,
        created,
        plural(created, "locale", "locales")
    ));
    Ok(ExitStatus::Success)
}

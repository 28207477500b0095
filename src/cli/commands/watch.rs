use anyhow::{Context, Result};
use colored::Colorize;
use tokio_util::sync::CancellationToken;

use super::{super::exit_status::ExitStatus, index_builder};
use crate::cli::{
    args::GlobalArgs,
    report::{SUCCESS_MARK, plural},
};
use crate::core::index::CacheSnapshot;

/// Keep the index live until Ctrl-C, printing a line per published snapshot.
pub fn watch(global: &GlobalArgs) -> Result<ExitStatus> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let index = index_builder(global)?.refresh_signal(print_snapshot).build();

    runtime.block_on(async {
        let stop = CancellationToken::new();
        index.initialize();
        index.watch(stop.clone())?;
        println!("Watching {} (Ctrl-C to stop)", global.root.display());

        tokio::select! {
            _ = stop.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl-C")?;
                stop.cancel();
            }
        }
        index.dispose();
        anyhow::Ok(())
    })?;
    Ok(ExitStatus::Success)
}

fn print_snapshot(snapshot: &CacheSnapshot) {
    let files = snapshot.files().len();
    let keys = snapshot.data().translations.len();
    let locales = snapshot.available_locales().len();
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!(
            "#{}: {} {}, {} {}, {} {}",
            snapshot.generation(),
            files,
            plural(files, "file", "files"),
            keys,
            plural(keys, "key", "keys"),
            locales,
            plural(locales, "locale", "locales")
        )
        .green()
    );
    let failures = snapshot.parse_failures().len();
    if failures > 0 {
        println!(
            "{} {} {} could not be parsed",
            "warning:".bold().yellow(),
            failures,
            plural(failures, "file", "files")
        );
    }
}

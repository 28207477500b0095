use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cli::args::GlobalArgs;
use crate::config::load_config;
use crate::core::{
    index::{TranslationIndex, TranslationIndexBuilder},
    namespace::ConfiguredModules,
};

/// Index builder for `--root`, configured from the nearest config file.
pub(crate) fn index_builder(global: &GlobalArgs) -> Result<TranslationIndexBuilder> {
    if !global.root.is_dir() {
        bail!("{} is not a directory", global.root.display());
    }
    // Watcher events carry absolute paths.
    let root = global
        .root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", global.root.display()))?;
    let loaded = load_config(&root)?;
    if loaded.from_file {
        tracing::debug!("loaded config for {}", root.display());
    }
    let modules = ConfiguredModules::new(&loaded.config);
    Ok(TranslationIndex::builder(root)
        .config(loaded.config)
        .module_graph(modules))
}

/// Build the index and its first snapshot on the calling thread.
pub(crate) fn open_index(global: &GlobalArgs) -> Result<TranslationIndex> {
    let index = index_builder(global)?.build();
    index.initialize();
    Ok(index)
}

/// `path` relative to `root`, with forward slashes.
pub(crate) fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

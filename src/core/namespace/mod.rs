//! Namespace and module resolution.
//!
//! - `binding_context`: scope stack of translator bindings
//! - `usages`: call-site scanning and key matching for source files
//!
//! [`get_full_key`] qualifies a call site's partial key with the namespace bound in its
//! scope. [`ModuleGraph`] maps translation files to project modules and modules to
//! their dependencies for module-scoped lookups.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::config::Config;
use crate::core::path_decoder::PathDecoder;

pub mod binding_context;
pub mod usages;

pub use usages::{KeyUsage, collect_file_usages, collect_usages};

/// Qualify `partial_key` with `namespace`.
///
/// The parts are joined with exactly one `.`. A partial key in `ns:key` form names its
/// own namespace and becomes `ns.key` regardless of the bound one. Without a namespace
/// the partial key is returned unchanged.
pub fn get_full_key(namespace: Option<&str>, partial_key: &str) -> String {
    if let Some((namespace, rest)) = split_namespaced(partial_key) {
        return join_namespace(namespace, rest);
    }
    match namespace {
        Some(namespace) if !namespace.trim_end_matches('.').is_empty() => {
            join_namespace(namespace, partial_key)
        }
        _ => partial_key.to_string(),
    }
}

fn join_namespace(namespace: &str, key: &str) -> String {
    format!(
        "{}.{}",
        namespace.trim_end_matches('.'),
        key.trim_start_matches('.')
    )
}

/// Split an `ns:key` partial key. Both sides must be non-empty.
pub(crate) fn split_namespaced(partial_key: &str) -> Option<(&str, &str)> {
    let (namespace, key) = partial_key.split_once(':')?;
    let well_formed = !namespace.is_empty()
        && !namespace.contains(char::is_whitespace)
        && key.starts_with(|c: char| !c.is_whitespace());
    well_formed.then_some((namespace, key))
}

/// The project's module structure.
///
/// Only used to partition the index for module-scoped queries; global queries never
/// depend on it.
pub trait ModuleGraph: Send + Sync {
    /// Module owning a translation file under `root`.
    fn module_of(&self, root: &Path, file: &Path) -> Option<String>;

    /// Modules `module` depends on, in lookup order.
    fn dependencies_of(&self, module: &str) -> Vec<String>;
}

/// Modules named by translation file paths, with dependencies declared in the config.
pub struct ConfiguredModules {
    decoder: PathDecoder,
    dependencies: BTreeMap<String, Vec<String>>,
}

impl ConfiguredModules {
    pub fn new(config: &Config) -> Self {
        Self {
            decoder: PathDecoder::new(&config.i18n_dirs),
            dependencies: config.modules.clone(),
        }
    }
}

impl ModuleGraph for ConfiguredModules {
    fn module_of(&self, root: &Path, file: &Path) -> Option<String> {
        self.decoder.decode(file, root).module
    }

    fn dependencies_of(&self, module: &str) -> Vec<String> {
        self.dependencies.get(module).cloned().unwrap_or_default()
    }
}

/// A fixed file-to-module assignment, for hosts that know their module layout.
#[derive(Debug, Default, Clone)]
pub struct StaticModules {
    pub files: BTreeMap<PathBuf, String>,
    pub dependencies: BTreeMap<String, Vec<String>>,
}

impl ModuleGraph for StaticModules {
    fn module_of(&self, root: &Path, file: &Path) -> Option<String> {
        let relative = file.strip_prefix(root).unwrap_or(file);
        self.files
            .get(relative)
            .or_else(|| self.files.get(file))
            .cloned()
    }

    fn dependencies_of(&self, module: &str) -> Vec<String> {
        self.dependencies.get(module).cloned().unwrap_or_default()
    }
}

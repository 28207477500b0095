//! Full rebuilds: scan, decode, parse and assemble one snapshot.

use std::{collections::HashMap, fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;

use super::snapshot::{CacheSnapshot, ParseFailure};
use crate::config::Config;
use crate::core::{
    data::{FileRef, Framework, TranslationData, TranslationFile},
    namespace::ModuleGraph,
    parsers::{self, Format, ParseContext},
    path_decoder::PathDecoder,
    scanner::TranslationScanner,
};

/// Inputs of one rebuild.
pub struct BuildRequest<'a> {
    pub root: &'a Path,
    pub config: &'a Config,
    pub modules: &'a dyn ModuleGraph,
    pub generation: u64,
}

/// Build a snapshot from the files on disk.
///
/// Returns `None` if `cancel` fires before the snapshot is complete. Files that cannot
/// be read or parsed are recorded as [`ParseFailure`]s and contribute no entries.
pub fn build_snapshot(
    request: &BuildRequest<'_>,
    cancel: &CancellationToken,
) -> Option<CacheSnapshot> {
    let scanner = TranslationScanner::new(request.root, request.config);
    let scan = scanner.scan();
    tracing::debug!(
        "generation {}: {} translation files ({} unreadable paths)",
        request.generation,
        scan.files.len(),
        scan.skipped_count
    );

    let outcomes: Vec<Option<Result<TranslationFile, ParseFailure>>> = scan
        .files
        .par_iter()
        .map(|path| {
            if cancel.is_cancelled() {
                return None;
            }
            let file = FileRef::from(path.as_path());
            Some(
                load_file(&file, request, scanner.decoder()).map_err(|e| ParseFailure {
                    file,
                    message: format!("{:#}", e),
                }),
            )
        })
        .collect();

    if cancel.is_cancelled() {
        tracing::debug!("generation {} cancelled", request.generation);
        return None;
    }

    let mut files = Vec::with_capacity(outcomes.len());
    let mut parse_failures = Vec::new();
    for outcome in outcomes.into_iter().flatten() {
        match outcome {
            Ok(file) => files.push(Arc::new(file)),
            Err(failure) => {
                tracing::warn!("{}: {}", failure.file, failure.message);
                parse_failures.push(failure);
            }
        }
    }

    let module_dependencies: HashMap<String, Vec<String>> = files
        .iter()
        .filter_map(|file| file.module.clone())
        .map(|module| {
            let dependencies = request.modules.dependencies_of(&module);
            (module, dependencies)
        })
        .collect();

    let data = TranslationData::from_files(files, Framework::detect(request.root));
    Some(CacheSnapshot::assemble(
        data,
        module_dependencies,
        parse_failures,
        &request.config.default_locale,
        request.generation,
    ))
}

/// Read and parse one translation file with the context decoded from its path.
pub fn load_file(
    file: &FileRef,
    request: &BuildRequest<'_>,
    decoder: &PathDecoder,
) -> Result<TranslationFile> {
    let path = file.path();
    let context = decoder.decode(path, request.root);
    let module = request.modules.module_of(request.root, path);
    let format = Format::from_path(path)
        .with_context(|| format!("Unsupported translation file {}", path.display()))?;

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let entries = parsers::parse(
        &content,
        Some(format),
        &ParseContext {
            file,
            key_prefix: &context.key_prefix,
            locale: &context.locale,
            module: module.as_deref(),
        },
    )?;

    Ok(TranslationFile {
        file: file.clone(),
        format,
        locale: context.locale,
        module,
        business_unit: context.business_unit,
        key_prefix: context.key_prefix,
        entries,
    })
}

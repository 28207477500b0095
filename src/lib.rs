//! Keyscope - translation index for i18n codebases
//!
//! Keyscope discovers the translation files of a project (JSON, YAML, TOML, Java-style
//! properties and JS/TS modules), decodes locale, module and key prefix from their
//! paths, and serves key lookups from an immutable snapshot that is rebuilt in the
//! background when files change. It can also create missing translations and rename
//! keys across every locale file and call site.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and validation
//! - `core`: Scanning, parsing, the index service and the consistency engine
//! - `findings`: Problems reported by `keyscope check`

pub mod cli;
pub mod config;
pub mod core;
pub mod findings;

//! The translation index and everything it is built from.
//!
//! ## Module Structure
//!
//! - `data`: entries, files and the corpus of one project state
//! - `locale`: locale recognition, normalization and fallback chains
//! - `path_decoder`: locale, module and key prefix from a file path
//! - `scanner`: discovery of translation and source files
//! - `parsers`: one parser per translation file format
//! - `namespace`: call-site scanning and module resolution
//! - `index`: snapshots and the long-lived index service
//! - `consistency`: creating missing entries and renaming keys

pub mod consistency;
pub mod data;
pub mod index;
pub mod locale;
pub mod namespace;
pub mod parsers;
pub mod path_decoder;
pub mod scanner;

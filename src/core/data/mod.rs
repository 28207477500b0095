//! Core data types shared by the parsers, the index and the consistency engine.
//!
//! ## Module Structure
//!
//! - `entry`: `FileRef` and `TranslationEntry` (one key in one file)
//! - `translation`: `TranslationFile` and `TranslationData` (one project state)
//! - `framework`: the detected i18n framework hint

pub mod entry;
pub mod framework;
pub mod translation;

pub use entry::{FileRef, TranslationEntry};
pub use framework::Framework;
pub use translation::{TranslationData, TranslationFile};

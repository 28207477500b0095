//! The translation index.
//!
//! - `snapshot`: one immutable generation and its read queries
//! - `builder`: scan and parse the project into a snapshot
//! - `service`: the long-lived index with coalesced, cancellable refreshes
//! - `watch`: file system notifications feeding the debounced refresh path

pub mod builder;
pub mod service;
pub mod snapshot;
pub mod watch;

pub use service::{IndexState, RefreshSignal, TranslationIndex, TranslationIndexBuilder};
pub use snapshot::{CacheSnapshot, ParseFailure};

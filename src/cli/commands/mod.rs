pub mod check;
pub mod fill;
pub mod init;
pub mod keys;
pub mod locales;
mod project;
pub mod rename;
pub mod show;
pub mod usages;
pub mod watch;

pub(crate) use project::{index_builder, open_index, relative};

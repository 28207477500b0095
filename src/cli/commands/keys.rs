use anyhow::Result;

use super::{super::exit_status::ExitStatus, open_index};
use crate::cli::args::{GlobalArgs, KeysCommand};

pub fn keys(global: &GlobalArgs, cmd: KeysCommand) -> Result<ExitStatus> {
    let index = open_index(global)?;
    let snapshot = index.snapshot();

    let mut keys = match cmd.module.as_deref() {
        Some(module) => snapshot.all_keys_for_module(module),
        None => snapshot.all_keys(),
    };
    if let Some(prefix) = cmd.prefix.as_deref() {
        keys.retain(|key| key.starts_with(prefix));
    }

    for key in &keys {
        println!("{}", key);
    }
    Ok(ExitStatus::Success)
}

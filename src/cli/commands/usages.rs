use anyhow::Result;
use colored::Colorize;

use super::{super::exit_status::ExitStatus, open_index, relative};
use crate::cli::args::{GlobalArgs, UsagesCommand};

pub fn usages(global: &GlobalArgs, cmd: UsagesCommand) -> Result<ExitStatus> {
    let index = open_index(global)?;

    let mut usages = index.find_usages(&cmd.key);
    usages.sort_by(|a, b| a.file.cmp(&b.file).then_with(|| a.offset.cmp(&b.offset)));
    for usage in &usages {
        let location = format!("{}:{}", relative(usage.file.path(), index.root()), usage.line);
        match usage.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            Some(namespace) => println!(
                "{}  {} {}",
                location,
                usage.partial_key,
                format!("(namespace {})", namespace).dimmed()
            ),
            None => println!("{}  {}", location, usage.partial_key),
        }
    }
    Ok(ExitStatus::Success)
}

use anyhow::Result;

use super::{super::exit_status::ExitStatus, open_index, relative};
use crate::cli::{
    args::{GlobalArgs, RenameCommand},
    report::{plural, print_done, print_failure},
};
use crate::core::consistency::{ConsistencyEngine, RenameOutcome};

pub fn rename(global: &GlobalArgs, cmd: RenameCommand) -> Result<ExitStatus> {
    let engine = ConsistencyEngine::new(open_index(global)?);
    let root = engine.index().root().to_path_buf();

    let plan = match engine.plan_rename(&cmd.old_key, &cmd.new_key) {
        Ok(plan) => plan,
        Err(reason) => {
            print_failure(&format!("cannot rename '{}': {}", cmd.old_key, reason));
            return Ok(ExitStatus::Failure);
        }
    };

    if !cmd.apply {
        println!("would rename '{}' to '{}' in:", plan.old_key, plan.new_key);
        for file in plan.files() {
            println!("  {}", relative(&file, &root));
        }
        for usage in &plan.usages {
            println!(
                "  {}:{}  {}",
                relative(usage.file.path(), &root),
                usage.line,
                usage.partial_key
            );
        }
        println!("Run with --apply to rename.");
        return Ok(ExitStatus::Success);
    }

    match engine.apply_rename(plan) {
        RenameOutcome::Renamed { files, usages } => {
            print_done(&format!(
                "Renamed '{}' to '{}' in {} {} ({} {})",
                cmd.old_key,
                cmd.new_key,
                files.len(),
                plural(files.len(), "file", "files"),
                usages,
                plural(usages, "call site", "call sites")
            ));
            Ok(ExitStatus::Success)
        }
        RenameOutcome::Blocked(reason) => {
            print_failure(&format!("cannot rename '{}': {}", cmd.old_key, reason));
            Ok(ExitStatus::Failure)
        }
    }
}

use anyhow::Result;

use super::{super::exit_status::ExitStatus, open_index};
use crate::cli::{
    args::GlobalArgs,
    report::{print_success, report},
};
use crate::findings::collect_findings;

pub fn check(global: &GlobalArgs) -> Result<ExitStatus> {
    let index = open_index(global)?;
    let snapshot = index.snapshot();
    let findings = collect_findings(&snapshot, index.root());

    if findings.is_empty() {
        print_success(snapshot.files().len(), snapshot.available_locales().len());
        return Ok(ExitStatus::Success);
    }
    report(&findings);
    Ok(ExitStatus::Failure)
}

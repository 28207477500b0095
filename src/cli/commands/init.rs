use std::{fs, path::Path};

use anyhow::Result;

use super::super::exit_status::ExitStatus;
use super::super::report::{print_done, print_failure};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init(root: &Path) -> Result<ExitStatus> {
    let config_path = root.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        print_failure(&format!("{} already exists", CONFIG_FILE_NAME));
        return Ok(ExitStatus::Failure);
    }

    fs::write(&config_path, default_config_json()? + "\n")?;
    print_done(&format!("Created {}", CONFIG_FILE_NAME));

    Ok(ExitStatus::Success)
}

//! Command line interface: argument parsing, dispatch and report output.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

mod args;
mod commands;
mod exit_status;
mod report;
mod run;

pub use args::{Arguments, Command, GlobalArgs};
pub use exit_status::ExitStatus;

/// Environment variable holding the log filter, e.g. `KEYSCOPE_LOG=keyscope=trace`.
pub const LOG_ENV: &str = "KEYSCOPE_LOG";

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    init_logging(args.global.verbose);

    let Some(args) = args.with_command_or_help() else {
        return Ok(ExitStatus::Success);
    };

    run::run(args)
}

/// Log to stderr so stdout stays parseable. `-v` raises the default level to debug.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

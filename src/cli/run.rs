/// Dispatch parsed arguments to their command.
use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands,
    exit_status::ExitStatus,
};

pub fn run(Arguments { global, command }: Arguments) -> Result<ExitStatus> {
    match command {
        Some(Command::Init) => commands::init::init(&global.root),
        Some(Command::Keys(cmd)) => commands::keys::keys(&global, cmd),
        Some(Command::Show(cmd)) => commands::show::show(&global, cmd),
        Some(Command::Locales) => commands::locales::locales(&global),
        Some(Command::Files) => commands::locales::files(&global),
        Some(Command::Check) => commands::check::check(&global),
        Some(Command::Usages(cmd)) => commands::usages::usages(&global, cmd),
        Some(Command::Fill(cmd)) => commands::fill::fill(&global, cmd),
        Some(Command::Rename(cmd)) => commands::rename::rename(&global, cmd),
        Some(Command::Watch) => commands::watch::watch(&global),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}

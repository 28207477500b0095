//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `keys`, `show`, `locales`, `files`, `usages`: read the index
//! - `check`: report missing translations and unparsable files
//! - `fill`, `rename`: edit translation files (dry run unless `--apply`)
//! - `watch`: keep the index live and print each published snapshot
//! - `init`: write the default configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }
}

/// Arguments shared by all commands.
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// Project root directory
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Args)]
pub struct KeysCommand {
    /// Only list keys starting with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// List the keys visible from this module
    #[arg(long)]
    pub module: Option<String>,
}

#[derive(Debug, Args)]
pub struct ShowCommand {
    pub key: String,

    /// Resolve for one locale, following its fallback chain
    #[arg(long)]
    pub locale: Option<String>,

    /// With --locale: no fallback
    #[arg(long, requires = "locale")]
    pub strict: bool,

    /// Resolve from this module and its dependencies first
    #[arg(long)]
    pub module: Option<String>,
}

#[derive(Debug, Args)]
pub struct UsagesCommand {
    pub key: String,
}

#[derive(Debug, Args)]
pub struct FillCommand {
    pub key: String,

    /// Locales to fill (default: every locale in the project)
    #[arg(long, num_args = 1.., value_delimiter = ',')]
    pub locales: Vec<String>,

    /// Value for the new entries (default: the default locale's value)
    #[arg(long)]
    pub value: Option<String>,

    /// Actually write the entries (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Args)]
pub struct RenameCommand {
    pub old_key: String,
    pub new_key: String,

    /// Actually rename (default is dry-run)
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List translation keys
    Keys(KeysCommand),
    /// Show the entries of a key in every locale
    Show(ShowCommand),
    /// List the locales of the project
    Locales,
    /// List parsed translation files
    Files,
    /// Report missing translations and files that failed to parse
    Check,
    /// List source locations using a key
    Usages(UsagesCommand),
    /// Create a key in the locales that lack it
    Fill(FillCommand),
    /// Rename a key in every locale file and call site
    Rename(RenameCommand),
    /// Watch translation files and rebuild on change
    Watch,
    /// Initialize a new .keyscoperc.json configuration file
    Init,
}

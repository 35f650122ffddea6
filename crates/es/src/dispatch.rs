//! Command dispatch module for routing CLI commands to their handlers.

use crate::cli::{Cli, Commands, ConfigCommands, Shell};
use crate::commands::config::{self, Config, ConfigSetOptions};
use crate::commands::parse::ParseArgs;
use crate::commands::{self, CommandContext, CommandError, Result};

/// A command resolved from the parsed CLI arguments.
pub enum Dispatch<'a> {
    Parse(ParseArgs),
    Keys,
    Config(&'a Option<ConfigCommands>),
    Completions(&'a Shell),
    Help,
}

impl<'a> Dispatch<'a> {
    /// Resolves the command to run.
    pub fn from_cli(cli: &'a Cli) -> Self {
        match &cli.command {
            Some(Commands::Parse {
                query,
                cursor,
                free_text,
                source,
            }) => Self::Parse(ParseArgs {
                query: query.clone(),
                cursor: *cursor,
                free_text: *free_text,
                source: source.clone(),
            }),
            Some(Commands::Keys) => Self::Keys,
            Some(Commands::Config { command }) => Self::Config(command),
            Some(Commands::Completions { shell }) => Self::Completions(shell),
            None => Self::Help,
        }
    }

    /// Runs the command.
    pub fn execute(&self, ctx: &CommandContext, config: &Config) -> Result<()> {
        match self {
            Self::Parse(args) => commands::parse::execute(ctx, config, args),
            Self::Keys => commands::keys::execute(ctx),
            Self::Config(command) => dispatch_config(ctx, command),
            Self::Completions(shell) => {
                commands::completions::execute(shell).map_err(CommandError::Io)
            }
            Self::Help => {
                if !ctx.quiet {
                    println!("es - Expense search query inspector");
                    println!("Use --help for usage information");
                }
                Ok(())
            }
        }
    }
}

/// Dispatch config subcommands.
fn dispatch_config(ctx: &CommandContext, command: &Option<ConfigCommands>) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => config::execute_show(ctx),
        Some(ConfigCommands::Init { force }) => config::execute_init(ctx, *force),
        Some(ConfigCommands::Set { key, value }) => {
            let opts = ConfigSetOptions {
                key: key.clone(),
                value: value.clone(),
            };
            config::execute_set(ctx, &opts)
        }
        Some(ConfigCommands::Path) => config::execute_path(ctx),
    }
}

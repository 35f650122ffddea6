//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the es CLI.

use clap::{Parser, Subcommand, ValueEnum};

/// es - Inspect expense search queries
#[derive(Parser, Debug)]
#[command(name = "es")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a search query and show its filters and autocomplete hint
    #[command(alias = "p")]
    Parse {
        /// The query text (e.g., 'tag:food,travel from:"john doe"')
        query: String,

        /// Byte offset of the cursor (default: end of query)
        #[arg(short, long)]
        cursor: Option<usize>,

        /// Emit free-text terms as filters without a key
        #[arg(long)]
        free_text: bool,

        /// Source name used in error locations
        #[arg(long)]
        source: Option<String>,
    },

    /// List the supported filter keys and operators
    #[command(alias = "k")]
    Keys,

    /// View and edit configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., parse.free_text, output.color)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}

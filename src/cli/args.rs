//! Command-line argument model

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::cli::commands::asset::AssetCommands;
use crate::cli::commands::case::CaseCommands;
use crate::cli::commands::completions::CompletionsArgs;
use crate::cli::commands::init::InitArgs;

#[derive(Parser, Debug)]
#[command(
    name = "fleetcare",
    version,
    about = "After-sales service tracking for rental equipment and vehicles",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(
        long = "format",
        short = 'f',
        global = true,
        value_enum,
        default_value_t = OutputFormat::Auto,
        env = "FLEETCARE_FORMAT"
    )]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Table for lists, readable summary for single records
    #[default]
    Auto,
    Table,
    Json,
    Yaml,
    Csv,
    /// Bare IDs, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project in the current directory
    Init(InitArgs),

    /// Register and maintain equipment and vehicles
    #[command(subcommand)]
    Asset(AssetCommands),

    /// Open and move service cases
    #[command(subcommand)]
    Case(CaseCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

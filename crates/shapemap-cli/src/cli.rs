//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Shapemap CLI - declarative, schema-aware object mapping
///
/// Compiles a mapping definition against an input and an output schema,
/// then applies it to data files.
#[derive(Parser, Debug)]
#[command(
    name = "shapemap",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, env = "SHAPEMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a definition and apply it to one or more data files
    Apply(ApplyArgs),

    /// Compile a definition and print its strategy tree
    Check(CheckArgs),
}

/// The three documents every compile needs
#[derive(clap::Args, Debug, Clone)]
pub struct MappingArgs {
    /// Path to the mapping definition (JSON or YAML)
    #[arg(short, long, value_name = "DEFINITION")]
    pub definition: PathBuf,

    /// Path to the input schema (JSON or YAML)
    #[arg(short, long, value_name = "SCHEMA")]
    pub input_schema: PathBuf,

    /// Path to the output schema (JSON or YAML)
    #[arg(short = 's', long, value_name = "SCHEMA")]
    pub output_schema: PathBuf,
}

/// Arguments for the apply command
#[derive(Parser, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub mapping: MappingArgs,

    /// Origin label stamped onto nested array elements
    #[arg(long)]
    pub origin: Option<String>,

    /// Data files to map; a JSON array file is mapped element by element
    #[arg(value_name = "DATA", required = true)]
    pub data: Vec<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub mapping: MappingArgs,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// Compact JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// YAML output
    Yaml,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

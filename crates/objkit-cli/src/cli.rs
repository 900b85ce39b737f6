use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use objkit_merge::ArrayStrategy;

#[derive(Parser)]
#[command(
    name = "objkit",
    about = "objkit: merge, pick, omit, flatten and validate JSON records",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with default options for each command
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Deep merge JSON files, later files winning
    Merge(MergeArgs),
    /// Keep only the listed keys
    Pick(PickArgs),
    /// Drop the listed keys
    Omit(OmitArgs),
    /// Collapse nesting into dot-joined keys
    Flatten(FlattenArgs),
    /// Check a record against a JSON schema
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Target file followed by source files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Replace nested mappings instead of merging them
    #[arg(long)]
    pub shallow: bool,
    /// Combine sequences using --strategy
    #[arg(long)]
    pub arrays: bool,
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<ArrayStrategy>,
}

#[derive(Args)]
pub struct PickArgs {
    pub file: PathBuf,
    #[arg(short, long = "key", required = true)]
    pub keys: Vec<String>,
    /// Skip keys the record does not have
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Args)]
pub struct OmitArgs {
    pub file: PathBuf,
    #[arg(short, long = "key", required = true)]
    pub keys: Vec<String>,
    #[arg(long)]
    pub deep: bool,
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct FlattenArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ValidateArgs {
    pub file: PathBuf,
    pub schema: PathBuf,
    /// Report schema fields the record lacks
    #[arg(long)]
    pub strict: bool,
    /// Report record fields the schema does not name
    #[arg(long)]
    pub no_extra: bool,
}

fn parse_strategy(s: &str) -> Result<ArrayStrategy, String> {
    s.parse().map_err(|e: objkit_merge::MergeError| e.to_string())
}

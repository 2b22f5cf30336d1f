use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vcmp",
    about = "Structural comparison and value hashing for JSON documents",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare two JSON documents and print the difference tree
    Compare(CompareArgs),
    /// Print the value hash of a JSON document
    Hash(HashArgs),
    /// Align two strings and print the spans
    Strings(StringsArgs),
}

/// Flags shared by the commands that build `CompareOptions`.
#[derive(Args, Clone, Debug, Default)]
pub struct OptionArgs {
    /// Load options from a TOML file; flags below are applied on top
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,
    /// Ignore reference identity when classifying differences
    #[arg(long)]
    pub values_only: bool,
    /// Skip members with this key (repeatable)
    #[arg(long = "exclude", value_name = "KEY")]
    pub exclude: Vec<String>,
}

#[derive(Args)]
pub struct CompareArgs {
    pub a: PathBuf,
    pub b: PathBuf,
    #[command(flatten)]
    pub options: OptionArgs,
    /// Align string leaves span by span
    #[arg(long)]
    pub diff_strings: bool,
    /// Align strings word by word instead of character by character
    #[arg(long)]
    pub word: bool,
    /// Also print comparisons with no differences
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct HashArgs {
    pub file: PathBuf,
    #[command(flatten)]
    pub options: OptionArgs,
}

#[derive(Args)]
pub struct StringsArgs {
    pub a: String,
    pub b: String,
    #[arg(long)]
    pub word: bool,
}

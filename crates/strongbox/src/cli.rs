//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Strongbox - secure bucket and GitHub OIDC role provisioning
#[derive(Parser, Debug)]
#[command(name = "strongbox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to strongbox.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Override a setting (key=value), e.g. --context enableEncryption=true
    #[arg(long = "context", value_name = "KEY=VALUE", global = true)]
    pub context: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the resource template
    Synth(SynthArgs),

    /// Show the named outputs the stack exports
    Outputs(OutputsArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Check derived names and the trust anchor against existing resources
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Write the template to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
pub struct OutputsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the normalized configuration and derived names
    Show(ConfigShowArgs),

    /// Validate the configuration
    Validate,
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Inventory of existing resources (YAML)
    #[arg(short, long)]
    pub inventory: Utf8PathBuf,
}

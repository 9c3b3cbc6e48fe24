//! Strongbox CLI
//!
//! Entry point for the `strongbox` command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let source = commands::ConfigSource {
        path: cli.config,
        context: cli.context,
    };

    match cli.command {
        Commands::Synth(args) => commands::synth::run(args, &source),
        Commands::Outputs(args) => commands::outputs::run(args, &source),
        Commands::Config(cmd) => commands::config::run(cmd, &source),
        Commands::Check(args) => commands::check::run(args, &source),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

//! Synth command

use anyhow::{Context, Result};
use strongbox_core::synth;

use super::ConfigSource;
use crate::cli::SynthArgs;
use crate::output;

pub fn run(args: SynthArgs, source: &ConfigSource) -> Result<()> {
    let graph = source.graph()?;
    let template = synth::render_string(&graph)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", template))
                .with_context(|| format!("Failed to write template to {}", path))?;
            output::success(&format!("Template written to {}", path));
        }
        None => println!("{}", template),
    }

    Ok(())
}

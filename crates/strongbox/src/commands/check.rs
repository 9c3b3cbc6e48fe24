//! Check command

use anyhow::{Context, Result};
use strongbox_core::{preflight, Inventory};

use super::ConfigSource;
use crate::cli::CheckArgs;
use crate::output;

pub fn run(args: CheckArgs, source: &ConfigSource) -> Result<()> {
    let graph = source.graph()?;
    let inventory = Inventory::load(&args.inventory)
        .with_context(|| format!("Failed to load inventory {}", args.inventory))?;

    output::header("Preflight");
    preflight::check(&graph, &inventory)?;

    for resource in graph.resources() {
        output::kv(&resource.kind.to_string(), &resource.logical_id);
    }
    output::success("No name collisions, trust anchor present");

    Ok(())
}

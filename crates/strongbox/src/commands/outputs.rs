//! Outputs command

use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

use super::ConfigSource;
use crate::cli::OutputsArgs;

#[derive(Tabled)]
struct OutputRow {
    #[tabled(rename = "export name")]
    export_name: String,
    value: String,
    description: String,
}

pub fn run(args: OutputsArgs, source: &ConfigSource) -> Result<()> {
    let graph = source.graph()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&graph.outputs().to_map())?);
        return Ok(());
    }

    let rows: Vec<OutputRow> = graph
        .outputs()
        .iter()
        .map(|(export_name, output)| OutputRow {
            export_name: export_name.to_string(),
            value: output.value.to_string(),
            description: output.description.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);

    Ok(())
}

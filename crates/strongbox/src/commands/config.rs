//! Config command

use anyhow::Result;
use strongbox_core::ResourceNames;

use super::ConfigSource;
use crate::cli::{ConfigCommands, ConfigShowArgs};
use crate::output;

pub fn run(cmd: ConfigCommands, source: &ConfigSource) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => show(args, source),
        ConfigCommands::Validate => validate(source),
    }
}

fn show(args: ConfigShowArgs, source: &ConfigSource) -> Result<()> {
    let config = source.resolve()?;
    let names = ResourceNames::derive(&config);

    let document = serde_json::json!({
        "config": config,
        "names": names,
    });

    if args.json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", serde_yaml_ng::to_string(&document)?);
    }

    Ok(())
}

fn validate(source: &ConfigSource) -> Result<()> {
    let graph = source.graph()?;
    let config = graph.config();

    output::success("Configuration is valid");
    output::kv("Project", &config.project_id);
    output::kv("Environment", &config.environment);
    output::kv("Store", &graph.store().name);

    if let Some(key) = graph.encryption_key() {
        output::kv("Key alias", &key.alias);
    }

    match graph.identity_role() {
        Some(role) => {
            output::kv("Role", &role.name);
            output::kv("Trusted subjects", &role.trust.subject_patterns.join(", "));
            if role.permissions.has_broad_grants() {
                output::warning(
                    "Role has account-wide provisioning permissions; narrow them for production use",
                );
            }
        }
        None => output::info("No identity repository configured, role will not be created"),
    }

    Ok(())
}

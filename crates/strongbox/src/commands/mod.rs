//! Command implementations

pub mod check;
pub mod config;
pub mod outputs;
pub mod synth;

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use strongbox_core::{ConfigLoader, GraphBuilder, ResolvedConfig, ResourceGraph};
use tracing::debug;

/// Where the stack configuration comes from
#[derive(Debug, Clone)]
pub struct ConfigSource {
    pub path: Option<Utf8PathBuf>,
    pub context: Vec<String>,
}

impl ConfigSource {
    /// Load all configuration layers and normalize them
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let loaded = ConfigLoader::new()
            .with_context(&self.context)?
            .load(self.path.as_deref())?;

        match &loaded.config_path {
            Some(path) => debug!("Using configuration {}", path),
            None => debug!("No configuration file, using environment and context only"),
        }

        loaded
            .config
            .normalize()
            .context("Failed to normalize configuration")
    }

    /// Load, normalize and build the resource graph
    pub fn graph(&self) -> Result<ResourceGraph> {
        let config = self.resolve()?;
        GraphBuilder::new(config)
            .build()
            .context("Failed to build resource graph")
    }
}

//! # strongbox-core
//!
//! Core library for Strongbox. From a handful of declarative options it
//! derives a secure object store, an optional rotating encryption key and an
//! optional GitHub OIDC role, together with their names, trust conditions,
//! permissions and exported outputs.
//!
//! The pipeline runs once, synchronously, and always in this order:
//! - [`config`]: normalize raw options into a [`ResolvedConfig`]
//! - [`naming`]: derive every identifier
//! - [`graph`]: build the resource graph and its named outputs
//! - [`policy`]: compose trust conditions and role permissions
//!
//! [`synth`] renders the result as a template and [`preflight`] checks it
//! against an inventory of existing resources.

pub mod config;
pub mod error;
pub mod graph;
pub mod naming;
pub mod policy;
pub mod preflight;
pub mod synth;
pub mod types;

pub use config::{ConfigLoader, ResolvedConfig, StackConfig};
pub use error::{Error, Result};
pub use graph::{GraphBuilder, ResourceGraph};
pub use naming::ResourceNames;
pub use preflight::Inventory;

/// Normalize `config` and build its resource graph
pub fn build_graph(config: StackConfig) -> Result<ResourceGraph> {
    GraphBuilder::new(config.normalize()?).build()
}

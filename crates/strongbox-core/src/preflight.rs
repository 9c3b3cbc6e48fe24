//! Preflight checks against resources that already exist in the target account
//!
//! The construction pass never looks at live infrastructure. These checks
//! let a caller fail early, before handing the graph to the provisioning
//! engine, when a derived name is taken or the identity provider is missing.

use crate::config::ACCOUNT_PSEUDO_REF;
use crate::error::{Error, Result};
use crate::graph::ResourceGraph;
use crate::types::ResourceKind;
use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use tracing::{debug, info};

/// Snapshot of what already exists in the target account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Inventory {
    pub stores: BTreeSet<String>,
    pub roles: BTreeSet<String>,
    pub key_aliases: BTreeSet<String>,
    pub exports: BTreeSet<String>,

    /// Locators of identity providers present in the account
    pub trust_anchors: BTreeSet<String>,
}

impl Inventory {
    /// Load an inventory from a YAML (or JSON) file
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }
}

/// Check a graph against an inventory, failing on the first problem
pub fn check(graph: &ResourceGraph, inventory: &Inventory) -> Result<()> {
    if let Some(key) = graph.encryption_key() {
        ensure_free(&inventory.key_aliases, ResourceKind::EncryptionKey, &key.alias)?;
    }

    ensure_free(&inventory.stores, ResourceKind::Store, &graph.store().name)?;

    if let Some(role) = graph.identity_role() {
        ensure_free(&inventory.roles, ResourceKind::IdentityRole, &role.name)?;

        let locator = &role.trust.anchor.locator;
        if !anchor_present(locator, &inventory.trust_anchors) {
            return Err(Error::missing_trust_anchor(locator));
        }
        debug!("Trust anchor {} present", locator);
    }

    for (export_name, _) in graph.outputs().iter() {
        if inventory.exports.contains(export_name) {
            return Err(Error::name_collision("export", export_name));
        }
    }

    info!(
        "Preflight passed for {} resources and {} outputs",
        graph.resources().len(),
        graph.outputs().len()
    );
    Ok(())
}

/// A locator without a configured account carries the account pseudo
/// reference; any concrete account id in its place counts as a match.
fn anchor_present(locator: &str, anchors: &BTreeSet<String>) -> bool {
    let Some((prefix, suffix)) = locator.split_once(ACCOUNT_PSEUDO_REF) else {
        return anchors.contains(locator);
    };

    anchors.iter().any(|anchor| {
        anchor.len() > prefix.len() + suffix.len()
            && anchor.starts_with(prefix)
            && anchor.ends_with(suffix)
            && !anchor[prefix.len()..anchor.len() - suffix.len()].contains(':')
    })
}

fn ensure_free(existing: &BTreeSet<String>, kind: ResourceKind, name: &str) -> Result<()> {
    if existing.contains(name) {
        return Err(Error::name_collision(kind.to_string(), name));
    }
    Ok(())
}

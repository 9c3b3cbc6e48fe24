//! The resource graph produced by one construction pass

mod builder;

pub use builder::GraphBuilder;

use crate::config::ResolvedConfig;
use crate::naming::ResourceNames;
use crate::types::{EncryptionKey, IdentityRole, NamedOutputs, ResourceRef, Store};

/// Immutable description of the resources to provision
///
/// Owns every node. Only [`GraphBuilder`] can create one, and nothing mutates
/// it afterwards.
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    config: ResolvedConfig,
    names: ResourceNames,
    key: Option<EncryptionKey>,
    store: Store,
    role: Option<IdentityRole>,
    outputs: NamedOutputs,
}

impl ResourceGraph {
    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn names(&self) -> &ResourceNames {
        &self.names
    }

    pub fn encryption_key(&self) -> Option<&EncryptionKey> {
        self.key.as_ref()
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn identity_role(&self) -> Option<&IdentityRole> {
        self.role.as_ref()
    }

    pub fn outputs(&self) -> &NamedOutputs {
        &self.outputs
    }

    /// References to every node, in construction order
    pub fn resources(&self) -> Vec<ResourceRef> {
        let mut refs = Vec::with_capacity(3);
        if let Some(key) = &self.key {
            refs.push(key.reference());
        }
        refs.push(self.store.reference());
        if let Some(role) = &self.role {
            refs.push(role.reference());
        }
        refs
    }
}

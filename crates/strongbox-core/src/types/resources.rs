//! Resource node types
//!
//! The graph root owns every node. Nodes refer to each other only through
//! [`ResourceRef`] values, never by holding another node.

use crate::types::policy::{RolePermissions, TrustPolicy};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Logical id of the encryption key
pub const KEY_LOGICAL_ID: &str = "BucketKey";

/// Logical id of the object store
pub const STORE_LOGICAL_ID: &str = "SecureBucket";

/// Logical id of the federated identity role
pub const ROLE_LOGICAL_ID: &str = "GithubOidcRole";

/// Longest session the role hands out, independent of configuration
pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(3600);

/// Kind of a resource node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    EncryptionKey,
    Store,
    IdentityRole,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::EncryptionKey => write!(f, "encryption key"),
            ResourceKind::Store => write!(f, "store"),
            ResourceKind::IdentityRole => write!(f, "identity role"),
        }
    }
}

/// Non-owning reference to a node in the same graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub logical_id: String,
    pub kind: ResourceKind,
}

impl ResourceRef {
    pub fn new(logical_id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            logical_id: logical_id.into(),
            kind,
        }
    }

    /// The `Arn` attribute of the referenced resource
    pub fn arn(&self) -> AttributeRef {
        AttributeRef::new(&self.logical_id, "Arn")
    }
}

/// An attribute of a resource, resolved by the provisioning substrate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRef {
    pub logical_id: String,
    pub attribute: String,
}

impl AttributeRef {
    pub fn new(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }
}

impl std::fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${{{}.{}}}", self.logical_id, self.attribute)
    }
}

/// What happens to a resource when the stack is torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    Destroy,
    Retain,
}

/// Customer-managed encryption key with automatic rotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionKey {
    pub logical_id: String,
    pub alias: String,
    pub rotation_enabled: bool,
    pub removal_policy: RemovalPolicy,
    pub tags: BTreeMap<String, String>,
}

impl EncryptionKey {
    pub fn new(alias: impl Into<String>, tags: BTreeMap<String, String>) -> Self {
        Self {
            logical_id: KEY_LOGICAL_ID.to_string(),
            alias: alias.into(),
            rotation_enabled: true,
            removal_policy: RemovalPolicy::Destroy,
            tags,
        }
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(&self.logical_id, ResourceKind::EncryptionKey)
    }
}

/// Server-side encryption applied to the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "mode")]
pub enum EncryptionMode {
    /// Encryption with keys managed by the storage service itself
    SubstrateManaged,
    /// Encryption with the graph's own key
    KeyManaged { key: ResourceRef },
}

impl EncryptionMode {
    pub fn key(&self) -> Option<&ResourceRef> {
        match self {
            EncryptionMode::SubstrateManaged => None,
            EncryptionMode::KeyManaged { key } => Some(key),
        }
    }
}

/// Public access block settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccessBlock {
    pub block_public_acls: bool,
    pub block_public_policy: bool,
    pub ignore_public_acls: bool,
    pub restrict_public_buckets: bool,
}

impl PublicAccessBlock {
    /// Every public access path blocked
    pub const fn all() -> Self {
        Self {
            block_public_acls: true,
            block_public_policy: true,
            ignore_public_acls: true,
            restrict_public_buckets: true,
        }
    }

    pub fn is_fully_blocked(&self) -> bool {
        self.block_public_acls
            && self.block_public_policy
            && self.ignore_public_acls
            && self.restrict_public_buckets
    }
}

/// The object store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub logical_id: String,
    pub name: String,
    pub versioned: bool,
    pub encryption: EncryptionMode,
    pub public_access: PublicAccessBlock,
    pub enforce_tls: bool,
    pub removal_policy: RemovalPolicy,
    pub auto_delete_objects: bool,
    pub tags: BTreeMap<String, String>,
}

impl Store {
    /// Build the store. Public access block and TLS enforcement are not
    /// configurable.
    pub fn new(
        name: impl Into<String>,
        versioned: bool,
        key: Option<&EncryptionKey>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        let encryption = match key {
            Some(key) => EncryptionMode::KeyManaged {
                key: key.reference(),
            },
            None => EncryptionMode::SubstrateManaged,
        };

        Self {
            logical_id: STORE_LOGICAL_ID.to_string(),
            name: name.into(),
            versioned,
            encryption,
            public_access: PublicAccessBlock::all(),
            enforce_tls: true,
            removal_policy: RemovalPolicy::Destroy,
            auto_delete_objects: true,
            tags,
        }
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(&self.logical_id, ResourceKind::Store)
    }
}

/// Role assumable through the federated identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRole {
    pub logical_id: String,
    pub name: String,
    pub trust: TrustPolicy,
    pub permissions: RolePermissions,
    #[serde(with = "duration_secs")]
    pub max_session_duration: Duration,
    pub store: ResourceRef,
    pub key: Option<ResourceRef>,
    pub tags: BTreeMap<String, String>,
}

impl IdentityRole {
    pub fn new(
        name: impl Into<String>,
        trust: TrustPolicy,
        permissions: RolePermissions,
        store: &Store,
        key: Option<&EncryptionKey>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            logical_id: ROLE_LOGICAL_ID.to_string(),
            name: name.into(),
            trust,
            permissions,
            max_session_duration: MAX_SESSION_DURATION,
            store: store.reference(),
            key: key.map(EncryptionKey::reference),
            tags,
        }
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(&self.logical_id, ResourceKind::IdentityRole)
    }
}

mod duration_secs {
    use serde::{Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_without_key_is_substrate_managed() {
        let store = Store::new("acme-secure-bucket-dev", false, None, BTreeMap::new());
        assert_eq!(store.encryption, EncryptionMode::SubstrateManaged);
        assert!(store.public_access.is_fully_blocked());
        assert!(store.enforce_tls);
        assert!(store.auto_delete_objects);
        assert_eq!(store.removal_policy, RemovalPolicy::Destroy);
    }

    #[test]
    fn test_store_with_key_references_it() {
        let key = EncryptionKey::new("alias/acme-bucket-key-dev", BTreeMap::new());
        let store = Store::new("acme-secure-bucket-dev", true, Some(&key), BTreeMap::new());

        assert!(key.rotation_enabled);
        assert!(store.versioned);
        assert_eq!(store.encryption.key(), Some(&key.reference()));
    }

    #[test]
    fn test_attribute_ref_display() {
        let arn = ResourceRef::new(ROLE_LOGICAL_ID, ResourceKind::IdentityRole).arn();
        assert_eq!(arn.to_string(), "${GithubOidcRole.Arn}");
    }
}

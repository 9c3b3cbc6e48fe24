//! Permission statements granted to the federated identity role

use crate::types::policy::{
    GrantBreadth, ManagedPolicy, PermissionStatement, ResourceScope, RolePermissions,
};
use crate::types::resources::{EncryptionKey, Store};
use tracing::{debug, warn};

/// Read/write access to the store and its objects
pub const STORE_READ_WRITE_ACTIONS: &[&str] = &[
    "s3:GetObject*",
    "s3:GetBucket*",
    "s3:List*",
    "s3:DeleteObject*",
    "s3:PutObject",
    "s3:PutObjectLegalHold",
    "s3:PutObjectRetention",
    "s3:PutObjectTagging",
    "s3:PutObjectVersionTagging",
    "s3:Abort*",
];

/// Encrypt/decrypt with the store key
pub const KEY_ENCRYPT_DECRYPT_ACTIONS: &[&str] = &[
    "kms:Decrypt",
    "kms:Encrypt",
    "kms:ReEncrypt*",
    "kms:GenerateDataKey*",
];

/// Managed policy giving the role full access to the provisioning service
pub const PROVISIONING_MANAGED_POLICY: &str = "arn:aws:iam::aws:policy/AWSCloudFormationFullAccess";

/// Account-wide actions needed to provision stacks from CI
pub const PROVISIONING_ACTIONS: &[&str] = &["iam:*", "s3:*", "kms:*"];

pub const STORE_READ_WRITE_SID: &str = "StoreReadWrite";
pub const KEY_ENCRYPT_DECRYPT_SID: &str = "KeyEncryptDecrypt";
pub const PROVISIONING_SID: &str = "ProvisioningAccess";

/// Derive the role's permissions from the store and optional key
///
/// Scoped grants come first. The provisioning grants that follow use
/// wildcard resources and are marked [`GrantBreadth::Broad`]; they exceed
/// least privilege and are reported as such.
pub fn compose(store: &Store, key: Option<&EncryptionKey>) -> RolePermissions {
    let store_arn = store.reference().arn();
    let mut statements = vec![PermissionStatement::allow(
        STORE_READ_WRITE_SID,
        STORE_READ_WRITE_ACTIONS,
        vec![
            ResourceScope::Resource(store_arn.clone()),
            ResourceScope::ObjectsOf(store_arn),
        ],
    )];

    if let Some(key) = key {
        statements.push(PermissionStatement::allow(
            KEY_ENCRYPT_DECRYPT_SID,
            KEY_ENCRYPT_DECRYPT_ACTIONS,
            vec![ResourceScope::Resource(key.reference().arn())],
        ));
    }

    statements.push(PermissionStatement::allow(
        PROVISIONING_SID,
        PROVISIONING_ACTIONS,
        vec![ResourceScope::Wildcard],
    ));

    let permissions = RolePermissions {
        statements,
        managed_policies: vec![ManagedPolicy {
            arn: PROVISIONING_MANAGED_POLICY.to_string(),
            breadth: GrantBreadth::Broad,
        }],
    };

    debug!(
        statements = permissions.statements.len(),
        "Composed role permissions"
    );
    warn!(
        "Identity role carries account-wide provisioning grants ({} and {})",
        PROVISIONING_MANAGED_POLICY,
        PROVISIONING_ACTIONS.join(", ")
    );

    permissions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::resources::{KEY_LOGICAL_ID, STORE_LOGICAL_ID};
    use crate::types::AttributeRef;
    use std::collections::BTreeMap;

    fn store(key: Option<&EncryptionKey>) -> Store {
        Store::new("acme-secure-bucket-dev", false, key, BTreeMap::new())
    }

    #[test]
    fn test_store_grant_is_scoped_to_store() {
        let permissions = compose(&store(None), None);
        let grant = permissions.statement(STORE_READ_WRITE_SID).unwrap();

        let arn = AttributeRef::new(STORE_LOGICAL_ID, "Arn");
        assert_eq!(
            grant.resources,
            vec![
                ResourceScope::Resource(arn.clone()),
                ResourceScope::ObjectsOf(arn)
            ]
        );
        assert_eq!(grant.breadth, GrantBreadth::Scoped);
        assert!(grant.actions.contains(&"s3:PutObject".to_string()));
    }

    #[test]
    fn test_no_key_grant_without_key() {
        let permissions = compose(&store(None), None);
        assert!(permissions.statement(KEY_ENCRYPT_DECRYPT_SID).is_none());
        assert_eq!(permissions.scoped_statements().count(), 1);
    }

    #[test]
    fn test_key_grant_scoped_to_key() {
        let key = EncryptionKey::new("alias/acme-bucket-key-dev", BTreeMap::new());
        let permissions = compose(&store(Some(&key)), Some(&key));

        let sids: Vec<&str> = permissions.statements.iter().map(|s| s.sid.as_str()).collect();
        assert_eq!(
            sids,
            vec![STORE_READ_WRITE_SID, KEY_ENCRYPT_DECRYPT_SID, PROVISIONING_SID]
        );

        let grant = permissions.statement(KEY_ENCRYPT_DECRYPT_SID).unwrap();
        assert_eq!(
            grant.resources,
            vec![ResourceScope::Resource(AttributeRef::new(KEY_LOGICAL_ID, "Arn"))]
        );
        assert_eq!(grant.breadth, GrantBreadth::Scoped);
    }

    #[test]
    fn test_broad_provisioning_grant_is_flagged() {
        let permissions = compose(&store(None), None);

        assert!(permissions.has_broad_grants());
        let broad: Vec<_> = permissions.broad_statements().collect();
        assert_eq!(broad.len(), 1);
        assert_eq!(broad[0].sid, PROVISIONING_SID);
        assert_eq!(broad[0].resources, vec![ResourceScope::Wildcard]);
        assert_eq!(broad[0].actions, vec!["iam:*", "s3:*", "kms:*"]);

        assert_eq!(
            permissions.managed_policies,
            vec![ManagedPolicy {
                arn: PROVISIONING_MANAGED_POLICY.to_string(),
                breadth: GrantBreadth::Broad,
            }]
        );
    }
}

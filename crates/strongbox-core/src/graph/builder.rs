//! Conditional construction of the resource graph
//!
//! Steps run in a fixed order because later nodes reference earlier ones:
//! 1. Encryption key, when encryption is enabled
//! 2. Store, always
//! 3. Identity role, when an identity repository is configured

use super::ResourceGraph;
use crate::config::ResolvedConfig;
use crate::error::{Error, Result};
use crate::naming::ResourceNames;
use crate::policy::{permissions, trust};
use crate::types::outputs::{KEY_OUTPUT_ID, ROLE_OUTPUT_ID, STORE_OUTPUT_ID};
use crate::types::{
    EncryptionKey, IdentityRole, NamedOutput, NamedOutputs, ResourceKind, Store, TrustAnchor,
};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Builds a [`ResourceGraph`] from a normalized configuration
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    config: ResolvedConfig,
    trust_anchor: Option<TrustAnchor>,
}

impl GraphBuilder {
    pub fn new(config: ResolvedConfig) -> Self {
        Self {
            config,
            trust_anchor: None,
        }
    }

    /// Use a specific identity provider instead of the GitHub provider in
    /// the target account
    pub fn with_trust_anchor(mut self, anchor: TrustAnchor) -> Self {
        self.trust_anchor = Some(anchor);
        self
    }

    /// Run the construction pass. Any failure aborts the whole graph.
    pub fn build(self) -> Result<ResourceGraph> {
        let names = ResourceNames::derive(&self.config);
        let tags = self.config.resource_tags();
        let mut claimed = ClaimedNames::default();
        let mut outputs = NamedOutputs::default();

        let key = if self.config.enable_encryption {
            claimed.claim(ResourceKind::EncryptionKey, &names.key_alias)?;
            let key = EncryptionKey::new(&names.key_alias, tags.clone());
            outputs.insert(
                &names.key_export,
                NamedOutput::attribute(
                    KEY_OUTPUT_ID,
                    "ARN of the bucket encryption key",
                    key.reference().arn(),
                ),
            )?;
            info!("Encryption key {} with rotation enabled", key.alias);
            Some(key)
        } else {
            debug!("Encryption disabled, store uses substrate-managed encryption");
            None
        };

        claimed.claim(ResourceKind::Store, &names.store)?;
        let store = Store::new(
            &names.store,
            self.config.enable_versioning,
            key.as_ref(),
            tags.clone(),
        );
        outputs.insert(
            &names.store_export,
            NamedOutput::literal(STORE_OUTPUT_ID, "Name of the secure bucket", &store.name),
        )?;
        info!(
            "Store {} (versioning: {})",
            store.name, self.config.enable_versioning
        );

        let role = match &self.config.identity_repo {
            Some(repo) => {
                claimed.claim(ResourceKind::IdentityRole, &names.role)?;
                let anchor = self
                    .trust_anchor
                    .clone()
                    .unwrap_or_else(|| TrustAnchor::github(self.config.target.account_ref()));

                let trust = trust::compose(anchor, repo, &self.config.additional_identity_repos);
                let permissions = permissions::compose(&store, key.as_ref());
                let role = IdentityRole::new(
                    &names.role,
                    trust,
                    permissions,
                    &store,
                    key.as_ref(),
                    tags,
                );
                outputs.insert(
                    &names.role_export,
                    NamedOutput::attribute(
                        ROLE_OUTPUT_ID,
                        "ARN of the GitHub OIDC role",
                        role.reference().arn(),
                    ),
                )?;
                info!(
                    "Identity role {} trusting {} repositories",
                    role.name,
                    role.trust.subject_patterns.len()
                );
                Some(role)
            }
            None => {
                debug!("No identity repository configured, skipping identity role");
                None
            }
        };

        Ok(ResourceGraph {
            config: self.config,
            names,
            key,
            store,
            role,
            outputs,
        })
    }
}

/// Physical names taken within one construction pass, per resource kind
#[derive(Debug, Default)]
struct ClaimedNames {
    names: BTreeSet<(ResourceKind, String)>,
}

impl ClaimedNames {
    fn claim(&mut self, kind: ResourceKind, name: &str) -> Result<()> {
        if !self.names.insert((kind, name.to_string())) {
            return Err(Error::name_collision(kind.to_string(), name));
        }
        Ok(())
    }
}

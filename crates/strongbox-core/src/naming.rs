//! Resource naming convention
//!
//! Every physical name and export name is a pure function of `projectId` and
//! `environment`. Re-running with the same configuration must produce the
//! same names so that re-provisioning stays idempotent.

use crate::config::ResolvedConfig;
use serde::Serialize;

/// All identifiers derived from a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNames {
    /// Object store name
    pub store: String,

    /// Encryption key alias (always `alias/` prefixed)
    pub key_alias: String,

    /// Federated identity role name
    pub role: String,

    /// Export name for the store name output
    pub store_export: String,

    /// Export name for the role ARN output
    pub role_export: String,

    /// Export name for the key ARN output
    pub key_export: String,
}

impl ResourceNames {
    pub fn derive(config: &ResolvedConfig) -> Self {
        let project = &config.project_id;
        let env = &config.environment;

        Self {
            store: format!("{}-secure-bucket-{}", project, env),
            key_alias: format!("alias/{}-bucket-key-{}", project, env),
            role: format!("{}-github-oidc-role-{}", project, env),
            store_export: format!("{}-bucket-name-{}", project, env),
            role_export: format!("{}-oidc-role-arn-{}", project, env),
            key_export: format!("{}-kms-key-arn-{}", project, env),
        }
    }
}

//! Stack configuration and normalization
//!
//! [`StackConfig`] is the raw, partially-populated input as it arrives from a
//! file, the environment or CLI context. [`StackConfig::normalize`] resolves
//! every optional field to a concrete value and yields a [`ResolvedConfig`],
//! which is the only configuration type the rest of the crate reads.

mod loader;

pub use loader::{ConfigLoader, LoadedConfig, CONFIG_FILE_NAMES};

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Environment used when none is configured
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Pseudo reference substituted for the account when none is configured
pub const ACCOUNT_PSEUDO_REF: &str = "${AWS::AccountId}";

/// Raw stack configuration with optional fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StackConfig {
    /// Project identifier, prefixes every derived name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Deployment environment (dev, staging, prod, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    /// Keep object versions in the store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_versioning: Option<bool>,

    /// Encrypt the store with a dedicated rotating key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_encryption: Option<bool>,

    /// Repository (`owner/repo`) allowed to assume the federated role
    #[serde(alias = "githubRepo", skip_serializing_if = "Option::is_none")]
    pub identity_repo: Option<String>,

    /// Further repositories trusted by the federated role
    #[serde(
        alias = "additionalGithubRepos",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_identity_repos: Option<Vec<String>>,

    /// Target account, only used to qualify the identity provider locator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    /// Target region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Extra tags applied to every resource
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

/// Account and region the graph is destined for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl DeploymentTarget {
    /// Account id, or the pseudo reference resolved at provisioning time
    pub fn account_ref(&self) -> &str {
        self.account.as_deref().unwrap_or(ACCOUNT_PSEUDO_REF)
    }
}

/// Fully-populated configuration produced by [`StackConfig::normalize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    pub project_id: String,
    pub environment: String,
    pub enable_versioning: bool,
    pub enable_encryption: bool,
    pub identity_repo: Option<String>,
    pub additional_identity_repos: Vec<String>,
    pub target: DeploymentTarget,
    pub tags: BTreeMap<String, String>,
}

impl StackConfig {
    /// Create a raw configuration carrying only a project id
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Default::default()
        }
    }

    /// Resolve defaults and reject configurations without a project id
    pub fn normalize(self) -> Result<ResolvedConfig> {
        let project_id = match self.project_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(Error::invalid_configuration(
                    "projectId is required and must not be empty",
                ))
            }
        };

        let environment = self
            .environment
            .filter(|env| !env.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());

        let identity_repo = self.identity_repo.filter(|repo| !repo.trim().is_empty());
        let additional_identity_repos = self.additional_identity_repos.unwrap_or_default();

        if identity_repo.is_none() && !additional_identity_repos.is_empty() {
            warn!(
                "additionalIdentityRepos is set without identityRepo; no identity role will be created"
            );
        }

        warn_on_illegal_name("projectId", &project_id);
        warn_on_illegal_name("environment", &environment);

        let resolved = ResolvedConfig {
            project_id,
            environment,
            enable_versioning: self.enable_versioning.unwrap_or(false),
            enable_encryption: self.enable_encryption.unwrap_or(false),
            identity_repo,
            additional_identity_repos,
            target: DeploymentTarget {
                account: self.account.filter(|a| !a.is_empty()),
                region: self.region.filter(|r| !r.is_empty()),
            },
            tags: self.tags,
        };

        debug!(
            project_id = %resolved.project_id,
            environment = %resolved.environment,
            "Normalized stack configuration"
        );

        Ok(resolved)
    }
}

impl ResolvedConfig {
    /// Tags applied to every resource; `Project` and `Environment` always win
    pub fn resource_tags(&self) -> BTreeMap<String, String> {
        let mut tags = self.tags.clone();
        tags.insert("Project".to_string(), self.project_id.clone());
        tags.insert("Environment".to_string(), self.environment.clone());
        tags
    }
}

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9-]+$").expect("valid name regex"))
}

/// Names are only checked by the provisioning substrate, so this only warns.
fn warn_on_illegal_name(field: &str, value: &str) {
    if !name_pattern().is_match(value) {
        warn!(
            "{} '{}' contains characters outside [a-z0-9-]; provisioning will likely reject derived names",
            field, value
        );
    }
}

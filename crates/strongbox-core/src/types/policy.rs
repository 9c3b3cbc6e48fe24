//! Trust and permission policy types

use crate::types::resources::AttributeRef;
use serde::Serialize;

/// Issuer of GitHub Actions OIDC tokens
pub const GITHUB_OIDC_ISSUER: &str = "token.actions.githubusercontent.com";

/// Audience GitHub Actions requests when exchanging tokens with STS
pub const STS_AUDIENCE: &str = "sts.amazonaws.com";

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Allow => write!(f, "Allow"),
            Effect::Deny => write!(f, "Deny"),
        }
    }
}

/// Whether a grant is confined to graph resources or spans the account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantBreadth {
    Scoped,
    Broad,
}

/// Resources a statement applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "scope", content = "target")]
pub enum ResourceScope {
    /// The resource itself
    Resource(AttributeRef),
    /// Every object inside the resource (`arn/*`)
    ObjectsOf(AttributeRef),
    /// `*`
    Wildcard,
}

/// One permission statement granted to the role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionStatement {
    pub sid: String,
    pub effect: Effect,
    pub actions: Vec<String>,
    pub resources: Vec<ResourceScope>,
    pub breadth: GrantBreadth,
}

impl PermissionStatement {
    pub fn allow(sid: impl Into<String>, actions: &[&str], resources: Vec<ResourceScope>) -> Self {
        let breadth = if resources.contains(&ResourceScope::Wildcard) {
            GrantBreadth::Broad
        } else {
            GrantBreadth::Scoped
        };

        Self {
            sid: sid.into(),
            effect: Effect::Allow,
            actions: actions.iter().map(|a| a.to_string()).collect(),
            resources,
            breadth,
        }
    }
}

/// An attached managed policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedPolicy {
    pub arn: String,
    pub breadth: GrantBreadth,
}

/// Everything the role is allowed to do, in grant order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissions {
    pub statements: Vec<PermissionStatement>,
    pub managed_policies: Vec<ManagedPolicy>,
}

impl RolePermissions {
    pub fn statement(&self, sid: &str) -> Option<&PermissionStatement> {
        self.statements.iter().find(|s| s.sid == sid)
    }

    pub fn scoped_statements(&self) -> impl Iterator<Item = &PermissionStatement> {
        self.statements
            .iter()
            .filter(|s| s.breadth == GrantBreadth::Scoped)
    }

    pub fn broad_statements(&self) -> impl Iterator<Item = &PermissionStatement> {
        self.statements
            .iter()
            .filter(|s| s.breadth == GrantBreadth::Broad)
    }

    /// True when any statement or managed policy reaches beyond graph resources
    pub fn has_broad_grants(&self) -> bool {
        self.broad_statements().next().is_some()
            || self
                .managed_policies
                .iter()
                .any(|p| p.breadth == GrantBreadth::Broad)
    }
}

/// Pre-existing identity provider the role federates with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustAnchor {
    /// Token issuer host, also the prefix of every claim condition key
    pub issuer: String,

    /// Account-qualified locator (ARN) of the provider
    pub locator: String,
}

impl TrustAnchor {
    pub fn new(issuer: impl Into<String>, locator: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            locator: locator.into(),
        }
    }

    /// GitHub Actions provider in `account`
    pub fn github(account: &str) -> Self {
        Self::new(
            GITHUB_OIDC_ISSUER,
            format!(
                "arn:aws:iam::{}:oidc-provider/{}",
                account, GITHUB_OIDC_ISSUER
            ),
        )
    }
}

/// Predicate over token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustCondition {
    /// Claim must equal one of the values
    StringEquals { key: String, values: Vec<String> },
    /// Claim must match one of the wildcard patterns
    StringLike { key: String, values: Vec<String> },
}

impl TrustCondition {
    pub fn operator(&self) -> &'static str {
        match self {
            TrustCondition::StringEquals { .. } => "StringEquals",
            TrustCondition::StringLike { .. } => "StringLike",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            TrustCondition::StringEquals { key, .. } | TrustCondition::StringLike { key, .. } => {
                key
            }
        }
    }

    pub fn values(&self) -> &[String] {
        match self {
            TrustCondition::StringEquals { values, .. }
            | TrustCondition::StringLike { values, .. } => values,
        }
    }
}

/// Who may assume the role
///
/// A token is accepted when it was issued by the anchor, its audience equals
/// `audience`, and its subject matches any of `subject_patterns`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustPolicy {
    pub anchor: TrustAnchor,
    pub audience: String,
    pub subject_patterns: Vec<String>,
}

impl TrustPolicy {
    /// Claim conditions, audience first
    pub fn conditions(&self) -> Vec<TrustCondition> {
        vec![
            TrustCondition::StringEquals {
                key: format!("{}:aud", self.anchor.issuer),
                values: vec![self.audience.clone()],
            },
            TrustCondition::StringLike {
                key: format!("{}:sub", self.anchor.issuer),
                values: self.subject_patterns.clone(),
            },
        ]
    }
}

/// Claims carried by a federated identity token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub issuer: String,
    pub audience: String,
    pub subject: String,
}

//! Trust policy derivation for the federated identity role

use crate::types::policy::{TokenClaims, TrustAnchor, TrustPolicy, STS_AUDIENCE};
use regex::{Regex, RegexSet};
use tracing::debug;

/// Sub-claim pattern accepting any ref, tag, pull request or environment
/// of `repo`
pub fn subject_pattern(repo: &str) -> String {
    format!("repo:{}:*", repo)
}

/// Derive the trust policy for `identity_repo` plus `additional_repos`
///
/// The primary repository always comes first, followed by the additional ones
/// in input order. Duplicates are kept.
pub fn compose(anchor: TrustAnchor, identity_repo: &str, additional_repos: &[String]) -> TrustPolicy {
    let subject_patterns: Vec<String> = std::iter::once(identity_repo)
        .chain(additional_repos.iter().map(String::as_str))
        .map(subject_pattern)
        .collect();

    debug!(
        provider = %anchor.locator,
        patterns = ?subject_patterns,
        "Derived trust conditions"
    );

    TrustPolicy {
        anchor,
        audience: STS_AUDIENCE.to_string(),
        subject_patterns,
    }
}

impl TrustPolicy {
    /// Evaluate the trust conditions against a token
    ///
    /// Subject patterns are compiled once per call into a single set.
    pub fn accepts(&self, claims: &TokenClaims) -> bool {
        if claims.issuer != self.anchor.issuer || claims.audience != self.audience {
            return false;
        }

        RegexSet::new(self.subject_patterns.iter().map(|p| like_to_regex(p)))
            .map(|set| set.is_match(&claims.subject))
            .unwrap_or(false)
    }
}

/// `StringLike` matching: `*` spans any run of characters, `?` exactly one
pub fn string_like(pattern: &str, value: &str) -> bool {
    Regex::new(&like_to_regex(pattern))
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

fn like_to_regex(pattern: &str) -> String {
    let mut expr = String::with_capacity(pattern.len() + 2);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            other => expr.push_str(&regex::escape(&other.to_string())),
        }
    }
    expr.push('$');
    expr
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::policy::{TrustCondition, GITHUB_OIDC_ISSUER};

    fn anchor() -> TrustAnchor {
        TrustAnchor::github("123456789012")
    }

    fn claims(subject: &str) -> TokenClaims {
        TokenClaims {
            issuer: GITHUB_OIDC_ISSUER.to_string(),
            audience: STS_AUDIENCE.to_string(),
            subject: subject.to_string(),
        }
    }

    #[test]
    fn test_single_repo_pattern() {
        let trust = compose(anchor(), "org/repo", &[]);
        assert_eq!(trust.subject_patterns, vec!["repo:org/repo:*"]);
        assert_eq!(trust.audience, "sts.amazonaws.com");
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let additional = vec!["org/b".to_string(), "org/a".to_string()];
        let trust = compose(anchor(), "org/a", &additional);
        assert_eq!(
            trust.subject_patterns,
            vec!["repo:org/a:*", "repo:org/b:*", "repo:org/a:*"]
        );
    }

    #[test]
    fn test_conditions() {
        let trust = compose(anchor(), "org/repo", &[]);
        let conditions = trust.conditions();

        assert_eq!(conditions.len(), 2);
        assert_eq!(
            conditions[0],
            TrustCondition::StringEquals {
                key: "token.actions.githubusercontent.com:aud".to_string(),
                values: vec!["sts.amazonaws.com".to_string()],
            }
        );
        assert_eq!(conditions[1].operator(), "StringLike");
        assert_eq!(conditions[1].key(), "token.actions.githubusercontent.com:sub");
        assert_eq!(conditions[1].values(), ["repo:org/repo:*".to_string()]);
    }

    #[test]
    fn test_accepts_any_ref_of_trusted_repo() {
        let trust = compose(anchor(), "org/repo", &["org/infra".to_string()]);

        assert!(trust.accepts(&claims("repo:org/repo:ref:refs/heads/main")));
        assert!(trust.accepts(&claims("repo:org/repo:pull_request")));
        assert!(trust.accepts(&claims("repo:org/repo:environment:prod")));
        assert!(trust.accepts(&claims("repo:org/infra:ref:refs/tags/v1.0.0")));
    }

    #[test]
    fn test_rejects_other_repos_and_lookalikes() {
        let trust = compose(anchor(), "org/repo", &[]);

        assert!(!trust.accepts(&claims("repo:org/other:ref:refs/heads/main")));
        assert!(!trust.accepts(&claims("repo:org/repository:ref:refs/heads/main")));
        assert!(!trust.accepts(&claims("repo:evil/org/repo:ref:refs/heads/main")));
    }

    #[test]
    fn test_rejects_wrong_audience_or_issuer() {
        let trust = compose(anchor(), "org/repo", &[]);

        let mut token = claims("repo:org/repo:ref:refs/heads/main");
        token.audience = "api://other".to_string();
        assert!(!trust.accepts(&token));

        let mut token = claims("repo:org/repo:ref:refs/heads/main");
        token.issuer = "gitlab.example.com".to_string();
        assert!(!trust.accepts(&token));
    }

    #[test]
    fn test_accepts_with_no_patterns_rejects() {
        let mut trust = compose(anchor(), "org/repo", &[]);
        trust.subject_patterns.clear();
        assert!(!trust.accepts(&claims("repo:org/repo:ref:refs/heads/main")));
    }

    #[test]
    fn test_like_to_regex_escapes_literals() {
        assert_eq!(like_to_regex("repo:o.r/*"), r"^repo:o\.r/.*$");
    }

    #[test]
    fn test_string_like() {
        assert!(string_like("repo:o/r:*", "repo:o/r:"));
        assert!(string_like("a?c", "abc"));
        assert!(!string_like("a?c", "ac"));
        assert!(string_like("a.b", "a.b"));
        assert!(!string_like("a.b", "axb"));
    }
}

//! End-to-end construction scenarios

mod common;

use common::{assert_encryption_consistent, assert_store_hardened, config, export_names, graph};
use std::collections::BTreeMap;
use strongbox_core::policy::permissions::{PROVISIONING_MANAGED_POLICY, PROVISIONING_SID};
use strongbox_core::types::{EncryptionMode, ResourceScope};
use strongbox_core::{build_graph, Error, StackConfig};

#[test]
fn test_scenario_minimal_store_only() {
    let graph = graph(config("acme", "dev"));

    assert_eq!(graph.store().name, "acme-secure-bucket-dev");
    assert!(graph.encryption_key().is_none());
    assert!(graph.identity_role().is_none());

    let expected: BTreeMap<String, String> = [(
        "acme-bucket-name-dev".to_string(),
        "acme-secure-bucket-dev".to_string(),
    )]
    .into_iter()
    .collect();
    assert_eq!(graph.outputs().to_map(), expected);
}

#[test]
fn test_scenario_encrypted_prod() {
    let graph = graph(StackConfig {
        enable_encryption: Some(true),
        ..config("acme", "prod")
    });

    let key = graph.encryption_key().expect("key should exist");
    assert_eq!(key.alias, "alias/acme-bucket-key-prod");
    assert!(key.rotation_enabled);
    assert!(matches!(
        graph.store().encryption,
        EncryptionMode::KeyManaged { .. }
    ));
    assert!(graph.outputs().contains("acme-kms-key-arn-prod"));
    assert!(!graph.outputs().contains("acme-oidc-role-arn-prod"));
}

#[test]
fn test_scenario_identity_role() {
    let graph = graph(StackConfig {
        identity_repo: Some("org/repo".to_string()),
        ..config("acme", "dev")
    });

    let role = graph.identity_role().expect("role should exist");
    assert_eq!(role.name, "acme-github-oidc-role-dev");
    assert_eq!(role.trust.subject_patterns, vec!["repo:org/repo:*"]);
    assert_eq!(role.max_session_duration.as_secs(), 3600);
    assert!(graph.outputs().contains("acme-oidc-role-arn-dev"));
    assert!(!graph.outputs().contains("acme-kms-key-arn-dev"));
}

#[test]
fn test_scenario_duplicate_repos_preserved() {
    let graph = graph(StackConfig {
        identity_repo: Some("org/a".to_string()),
        additional_identity_repos: Some(vec!["org/b".to_string(), "org/a".to_string()]),
        ..config("acme", "dev")
    });

    assert_eq!(
        graph.identity_role().unwrap().trust.subject_patterns,
        vec!["repo:org/a:*", "repo:org/b:*", "repo:org/a:*"]
    );
}

#[test]
fn test_store_invariants_hold_for_every_flag_combination() {
    for encryption in [false, true] {
        for versioning in [false, true] {
            for repo in [None, Some("org/repo".to_string())] {
                let graph = graph(StackConfig {
                    enable_encryption: Some(encryption),
                    enable_versioning: Some(versioning),
                    identity_repo: repo.clone(),
                    ..config("acme", "dev")
                });

                assert_store_hardened(&graph);
                assert_encryption_consistent(&graph);
                assert_eq!(graph.store().versioned, versioning);
                assert_eq!(graph.identity_role().is_some(), repo.is_some());
                assert_eq!(
                    graph.outputs().len(),
                    1 + usize::from(encryption) + usize::from(repo.is_some())
                );
            }
        }
    }
}

#[test]
fn test_outputs_mirror_node_existence() {
    let graph = graph(StackConfig {
        enable_encryption: Some(true),
        identity_repo: Some("org/repo".to_string()),
        ..config("acme", "staging")
    });

    assert_eq!(
        export_names(&graph),
        vec![
            "acme-bucket-name-staging",
            "acme-kms-key-arn-staging",
            "acme-oidc-role-arn-staging",
        ]
    );
}

#[test]
fn test_default_environment_is_dev() {
    let graph = graph(StackConfig::new("acme"));
    assert_eq!(graph.config().environment, "dev");
    assert_eq!(graph.store().name, "acme-secure-bucket-dev");
}

#[test]
fn test_empty_project_id_fails_fast() {
    let err = build_graph(StackConfig::new("")).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration { .. }));
}

#[test]
fn test_identity_repo_does_not_change_store_or_key_names() {
    let without = graph(StackConfig {
        enable_encryption: Some(true),
        ..config("acme", "dev")
    });
    let with = graph(StackConfig {
        enable_encryption: Some(true),
        identity_repo: Some("org/repo".to_string()),
        ..config("acme", "dev")
    });

    assert_eq!(without.store().name, with.store().name);
    assert_eq!(
        without.encryption_key().unwrap().alias,
        with.encryption_key().unwrap().alias
    );
}

#[test]
fn test_broad_grant_present_alongside_scoped_grants() {
    let graph = graph(StackConfig {
        enable_encryption: Some(true),
        identity_repo: Some("org/repo".to_string()),
        ..config("acme", "dev")
    });
    let permissions = &graph.identity_role().unwrap().permissions;

    assert_eq!(permissions.scoped_statements().count(), 2);
    assert!(permissions
        .scoped_statements()
        .all(|s| !s.resources.contains(&ResourceScope::Wildcard)));

    // Known over-privilege: account-wide provisioning access.
    assert!(permissions.has_broad_grants());
    assert_eq!(
        permissions.broad_statements().map(|s| s.sid.as_str()).collect::<Vec<_>>(),
        vec![PROVISIONING_SID]
    );
    assert!(permissions
        .managed_policies
        .iter()
        .any(|p| p.arn == PROVISIONING_MANAGED_POLICY));
}

//! Shared helpers for graph scenario tests

#![allow(dead_code)]

use strongbox_core::types::EncryptionMode;
use strongbox_core::{build_graph, ResourceGraph, StackConfig};

/// Raw configuration for `project`/`environment`
pub fn config(project: &str, environment: &str) -> StackConfig {
    StackConfig {
        environment: Some(environment.to_string()),
        ..StackConfig::new(project)
    }
}

/// Build a graph, panicking with the error on failure
pub fn graph(config: StackConfig) -> ResourceGraph {
    build_graph(config).unwrap_or_else(|e| panic!("Graph construction failed: {}", e))
}

/// Assert the security invariants every store must carry
pub fn assert_store_hardened(graph: &ResourceGraph) {
    let store = graph.store();
    assert!(
        store.public_access.is_fully_blocked(),
        "Store {} does not block all public access",
        store.name
    );
    assert!(store.enforce_tls, "Store {} does not enforce TLS", store.name);
    assert!(
        store.auto_delete_objects,
        "Store {} keeps objects on teardown",
        store.name
    );
}

/// Assert the store's encryption matches the presence of a key
pub fn assert_encryption_consistent(graph: &ResourceGraph) {
    match (graph.encryption_key(), &graph.store().encryption) {
        (None, EncryptionMode::SubstrateManaged) => {}
        (Some(key), EncryptionMode::KeyManaged { key: reference }) => {
            assert_eq!(&key.reference(), reference);
            assert!(key.rotation_enabled, "Key {} does not rotate", key.alias);
        }
        (key, mode) => panic!(
            "Inconsistent encryption: key present = {}, mode = {:?}",
            key.is_some(),
            mode
        ),
    }
}

/// Export names of the graph's outputs, in order
pub fn export_names(graph: &ResourceGraph) -> Vec<String> {
    graph
        .outputs()
        .iter()
        .map(|(name, _)| name.to_string())
        .collect()
}

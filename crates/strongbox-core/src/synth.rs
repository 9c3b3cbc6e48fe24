//! Template synthesis
//!
//! Renders a [`ResourceGraph`] as a CloudFormation-shaped JSON document. The
//! output is deterministic: the same graph always renders byte-identical JSON.

use crate::error::Result;
use crate::graph::ResourceGraph;
use crate::types::{
    AttributeRef, EncryptionKey, EncryptionMode, IdentityRole, OutputValue, RemovalPolicy,
    ResourceScope, Store, TrustCondition,
};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// IAM policy language version
const POLICY_VERSION: &str = "2012-10-17";

/// Tag marking a bucket whose objects are purged on teardown
pub const AUTO_DELETE_OBJECTS_TAG: &str = "aws-cdk:auto-delete-objects";

/// Render the whole graph
pub fn render(graph: &ResourceGraph) -> Value {
    let config = graph.config();
    let mut resources = Map::new();

    if let Some(key) = graph.encryption_key() {
        resources.insert(key.logical_id.clone(), render_key(key, config.target.account_ref()));
        resources.insert(format!("{}Alias", key.logical_id), render_alias(key));
    }

    let store = graph.store();
    resources.insert(store.logical_id.clone(), render_store(store));
    if store.enforce_tls {
        resources.insert(format!("{}Policy", store.logical_id), render_tls_policy(store));
    }

    if let Some(role) = graph.identity_role() {
        resources.insert(role.logical_id.clone(), render_role(role));
    }

    let mut outputs = Map::new();
    for (export_name, output) in graph.outputs().iter() {
        outputs.insert(
            output.logical_id.clone(),
            json!({
                "Description": output.description,
                "Value": render_output_value(&output.value),
                "Export": { "Name": export_name },
            }),
        );
    }

    json!({
        "AWSTemplateFormatVersion": "2010-09-09",
        "Description": format!(
            "Secure bucket for {} ({})",
            config.project_id, config.environment
        ),
        "Resources": resources,
        "Outputs": outputs,
    })
}

/// Render the graph as pretty-printed JSON
pub fn render_string(graph: &ResourceGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&render(graph))?)
}

fn render_key(key: &EncryptionKey, account: &str) -> Value {
    let root = sub_if_needed(&format!("arn:aws:iam::{}:root", account));
    with_removal(
        json!({
            "Type": "AWS::KMS::Key",
            "Properties": {
                "EnableKeyRotation": key.rotation_enabled,
                "KeyPolicy": {
                    "Version": POLICY_VERSION,
                    "Statement": [{
                        "Effect": "Allow",
                        "Principal": { "AWS": root },
                        "Action": "kms:*",
                        "Resource": "*",
                    }],
                },
                "Tags": render_tags(&key.tags),
            },
        }),
        key.removal_policy,
    )
}

fn render_alias(key: &EncryptionKey) -> Value {
    json!({
        "Type": "AWS::KMS::Alias",
        "Properties": {
            "AliasName": key.alias,
            "TargetKeyId": { "Ref": key.logical_id },
        },
    })
}

fn render_store(store: &Store) -> Value {
    let encryption = match &store.encryption {
        EncryptionMode::SubstrateManaged => json!({ "SSEAlgorithm": "AES256" }),
        EncryptionMode::KeyManaged { key } => json!({
            "SSEAlgorithm": "aws:kms",
            "KMSMasterKeyID": get_att(&key.arn()),
        }),
    };

    let mut tags = store.tags.clone();
    if store.auto_delete_objects {
        tags.insert(AUTO_DELETE_OBJECTS_TAG.to_string(), "true".to_string());
    }

    let mut properties = Map::new();
    properties.insert("BucketName".into(), json!(store.name));
    properties.insert(
        "BucketEncryption".into(),
        json!({
            "ServerSideEncryptionConfiguration": [{
                "ServerSideEncryptionByDefault": encryption,
            }],
        }),
    );
    properties.insert(
        "PublicAccessBlockConfiguration".into(),
        json!({
            "BlockPublicAcls": store.public_access.block_public_acls,
            "BlockPublicPolicy": store.public_access.block_public_policy,
            "IgnorePublicAcls": store.public_access.ignore_public_acls,
            "RestrictPublicBuckets": store.public_access.restrict_public_buckets,
        }),
    );
    if store.versioned {
        properties.insert(
            "VersioningConfiguration".into(),
            json!({ "Status": "Enabled" }),
        );
    }
    properties.insert("Tags".into(), render_tags(&tags));

    with_removal(
        json!({
            "Type": "AWS::S3::Bucket",
            "Properties": properties,
        }),
        store.removal_policy,
    )
}

fn render_tls_policy(store: &Store) -> Value {
    let arn = store.reference().arn();
    json!({
        "Type": "AWS::S3::BucketPolicy",
        "Properties": {
            "Bucket": { "Ref": store.logical_id },
            "PolicyDocument": {
                "Version": POLICY_VERSION,
                "Statement": [{
                    "Effect": "Deny",
                    "Principal": { "AWS": "*" },
                    "Action": "s3:*",
                    "Condition": { "Bool": { "aws:SecureTransport": "false" } },
                    "Resource": [
                        render_scope(&ResourceScope::Resource(arn.clone())),
                        render_scope(&ResourceScope::ObjectsOf(arn)),
                    ],
                }],
            },
        },
    })
}

fn render_role(role: &IdentityRole) -> Value {
    let mut conditions = Map::new();
    for condition in role.trust.conditions() {
        let values: Value = match &condition {
            TrustCondition::StringEquals { values, .. } if values.len() == 1 => {
                json!(values[0])
            }
            _ => json!(condition.values()),
        };
        let mut claim = Map::new();
        claim.insert(condition.key().to_string(), values);
        conditions.insert(condition.operator().to_string(), Value::Object(claim));
    }

    let statements: Vec<Value> = role
        .permissions
        .statements
        .iter()
        .map(|statement| {
            let resources: Vec<Value> = statement.resources.iter().map(render_scope).collect();
            json!({
                "Sid": statement.sid,
                "Effect": statement.effect.to_string(),
                "Action": statement.actions,
                "Resource": resources,
            })
        })
        .collect();

    let managed: Vec<&str> = role
        .permissions
        .managed_policies
        .iter()
        .map(|p| p.arn.as_str())
        .collect();

    json!({
        "Type": "AWS::IAM::Role",
        "Properties": {
            "RoleName": role.name,
            "AssumeRolePolicyDocument": {
                "Version": POLICY_VERSION,
                "Statement": [{
                    "Effect": "Allow",
                    "Principal": { "Federated": sub_if_needed(&role.trust.anchor.locator) },
                    "Action": "sts:AssumeRoleWithWebIdentity",
                    "Condition": conditions,
                }],
            },
            "ManagedPolicyArns": managed,
            "MaxSessionDuration": role.max_session_duration.as_secs(),
            "Policies": [{
                "PolicyName": format!("{}-policy", role.name),
                "PolicyDocument": {
                    "Version": POLICY_VERSION,
                    "Statement": statements,
                },
            }],
            "Tags": render_tags(&role.tags),
        },
    })
}

fn render_scope(scope: &ResourceScope) -> Value {
    match scope {
        ResourceScope::Resource(attr) => get_att(attr),
        ResourceScope::ObjectsOf(attr) => json!({
            "Fn::Join": ["", [get_att(attr), "/*"]],
        }),
        ResourceScope::Wildcard => json!("*"),
    }
}

fn render_output_value(value: &OutputValue) -> Value {
    match value {
        OutputValue::Literal(literal) => json!(literal),
        OutputValue::Attribute(attr) => get_att(attr),
    }
}

fn render_tags(tags: &BTreeMap<String, String>) -> Value {
    tags.iter()
        .map(|(key, value)| json!({ "Key": key, "Value": value }))
        .collect()
}

fn with_removal(mut resource: Value, policy: RemovalPolicy) -> Value {
    let policy = match policy {
        RemovalPolicy::Destroy => "Delete",
        RemovalPolicy::Retain => "Retain",
    };
    if let Some(obj) = resource.as_object_mut() {
        obj.insert("DeletionPolicy".into(), json!(policy));
        obj.insert("UpdateReplacePolicy".into(), json!(policy));
    }
    resource
}

fn get_att(attr: &AttributeRef) -> Value {
    json!({ "Fn::GetAtt": [attr.logical_id, attr.attribute] })
}

/// Strings holding pseudo references need `Fn::Sub` to be resolved
fn sub_if_needed(value: &str) -> Value {
    if value.contains("${") {
        json!({ "Fn::Sub": value })
    } else {
        json!(value)
    }
}

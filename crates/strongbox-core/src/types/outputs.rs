//! Named outputs surfaced to operators and downstream automation

use crate::error::{Error, Result};
use crate::types::resources::AttributeRef;
use serde::Serialize;
use std::collections::BTreeMap;

/// Logical id of the store name output
pub const STORE_OUTPUT_ID: &str = "BucketName";

/// Logical id of the role ARN output
pub const ROLE_OUTPUT_ID: &str = "OidcRoleArn";

/// Logical id of the key ARN output
pub const KEY_OUTPUT_ID: &str = "KmsKeyArn";

/// Value of an output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutputValue {
    /// Known at construction time
    Literal(String),
    /// Resolved by the provisioning substrate
    Attribute(AttributeRef),
}

impl std::fmt::Display for OutputValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputValue::Literal(value) => write!(f, "{}", value),
            OutputValue::Attribute(attr) => write!(f, "{}", attr),
        }
    }
}

/// A single exported output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedOutput {
    pub logical_id: String,
    pub description: String,
    pub value: OutputValue,
}

impl NamedOutput {
    pub fn literal(
        logical_id: impl Into<String>,
        description: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            description: description.into(),
            value: OutputValue::Literal(value.into()),
        }
    }

    pub fn attribute(
        logical_id: impl Into<String>,
        description: impl Into<String>,
        value: AttributeRef,
    ) -> Self {
        Self {
            logical_id: logical_id.into(),
            description: description.into(),
            value: OutputValue::Attribute(value),
        }
    }
}

/// Outputs keyed by export name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NamedOutputs {
    entries: BTreeMap<String, NamedOutput>,
}

impl NamedOutputs {
    /// Register an output; export names are unique
    pub fn insert(&mut self, export_name: impl Into<String>, output: NamedOutput) -> Result<()> {
        let export_name = export_name.into();
        if self.entries.contains_key(&export_name) {
            return Err(Error::name_collision("export", export_name));
        }
        if self
            .entries
            .values()
            .any(|existing| existing.logical_id == output.logical_id)
        {
            return Err(Error::name_collision("output", output.logical_id));
        }
        self.entries.insert(export_name, output);
        Ok(())
    }

    pub fn get(&self, export_name: &str) -> Option<&NamedOutput> {
        self.entries.get(export_name)
    }

    pub fn contains(&self, export_name: &str) -> bool {
        self.entries.contains_key(export_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Outputs in export-name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedOutput)> {
        self.entries.iter().map(|(name, output)| (name.as_str(), output))
    }

    /// Export names mapped to their rendered values
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(name, output)| (name.clone(), output.value.to_string()))
            .collect()
    }
}

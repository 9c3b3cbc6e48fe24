//! Error types for strongbox-core

use thiserror::Error;

/// Result type alias using strongbox-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Strongbox
///
/// Every variant is fatal to a construction pass. Nothing in this crate
/// retries or recovers; callers receive the error verbatim.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field is missing or malformed
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// A derived identifier is already taken
    #[error("Name collision: {kind} '{name}' already exists")]
    NameCollision { kind: String, name: String },

    /// The identity-provider trust anchor referenced by a role does not exist
    #[error("Missing trust anchor: identity provider {locator} does not exist in the target account")]
    MissingTrustAnchor { locator: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create a name collision error
    pub fn name_collision(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NameCollision {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a missing trust anchor error
    pub fn missing_trust_anchor(locator: impl Into<String>) -> Self {
        Self::MissingTrustAnchor {
            locator: locator.into(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

//! Layered configuration loading
//!
//! Sources are applied with the following precedence (low to high):
//! 1. Configuration file (strongbox.yaml)
//! 2. Environment variables (STRONGBOX_* prefix)
//! 3. CLI context pairs (`--context key=value`)

use super::StackConfig;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use tracing::debug;

/// Configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["strongbox.yaml", "strongbox.yml"];

/// Environment variables and the setting each one overrides
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("STRONGBOX_PROJECT_ID", "projectId"),
    ("STRONGBOX_ENVIRONMENT", "environment"),
    ("STRONGBOX_ENABLE_VERSIONING", "enableVersioning"),
    ("STRONGBOX_ENABLE_ENCRYPTION", "enableEncryption"),
    ("STRONGBOX_IDENTITY_REPO", "identityRepo"),
    ("STRONGBOX_ADDITIONAL_IDENTITY_REPOS", "additionalIdentityRepos"),
    ("STRONGBOX_ACCOUNT", "account"),
    ("STRONGBOX_REGION", "region"),
];

/// Raw configuration together with the file it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: StackConfig,

    /// Path of the configuration file, if one was found
    pub config_path: Option<Utf8PathBuf>,
}

/// Loads a [`StackConfig`] from file, environment and context overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    context: Vec<(String, String)>,
    skip_env: bool,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `key=value` context pairs, applied last
    pub fn with_context<I, S>(mut self, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::invalid_configuration(format!(
                    "Context '{}' must have the form key=value",
                    pair
                ))
            })?;
            self.context
                .push((key.trim().to_string(), value.trim().to_string()));
        }
        Ok(self)
    }

    /// Ignore STRONGBOX_* environment variables
    pub fn without_env(mut self) -> Self {
        self.skip_env = true;
        self
    }

    /// Load from `path`, or search the current directory and its parents
    ///
    /// An explicit path that does not exist is an error. When searching, a
    /// missing file is not: the environment and context may supply everything.
    pub fn load(&self, path: Option<&Utf8Path>) -> Result<LoadedConfig> {
        let found = match path {
            Some(p) => {
                let content = fs::read_to_string(p).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        Error::config_not_found(p.as_str())
                    } else {
                        Error::Io(e)
                    }
                })?;
                Some((p.to_owned(), content))
            }
            None => {
                let cwd = std::env::current_dir()?;
                let cwd = Utf8PathBuf::try_from(cwd).map_err(|_| {
                    Error::invalid_configuration("Current directory path is not valid UTF-8")
                })?;
                find_config_from(&cwd)?
            }
        };

        let (mut config, config_path) = match found {
            Some((p, content)) => {
                debug!("Loading configuration from {}", p);
                (parse_config(&content)?, Some(p))
            }
            None => {
                debug!("No configuration file found, relying on environment and context");
                (StackConfig::default(), None)
            }
        };

        if !self.skip_env {
            apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        }

        for (key, value) in &self.context {
            apply_setting(&mut config, key, value)?;
        }

        Ok(LoadedConfig {
            config,
            config_path,
        })
    }
}

/// Parse YAML configuration content; an empty document yields defaults
pub fn parse_config(content: &str) -> Result<StackConfig> {
    if content.trim().is_empty() {
        return Ok(StackConfig::default());
    }
    Ok(serde_yaml_ng::from_str(content)?)
}

/// Search `start` and its parents for a configuration file
fn find_config_from(start: &Utf8Path) -> Result<Option<(Utf8PathBuf, String)>> {
    let mut current = Some(start);

    while let Some(dir) = current {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                return Ok(Some((path, content)));
            }
        }
        current = dir.parent();
    }

    Ok(None)
}

fn apply_env_overrides<F>(config: &mut StackConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    for (var, key) in ENV_OVERRIDES {
        if let Some(value) = lookup(var) {
            debug!("Applying {} from environment", key);
            apply_setting(config, key, &value)?;
        }
    }
    Ok(())
}

/// Apply a single named setting to the raw configuration
pub fn apply_setting(config: &mut StackConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "projectId" => config.project_id = Some(value.to_string()),
        "environment" => config.environment = Some(value.to_string()),
        "enableVersioning" => config.enable_versioning = Some(parse_bool(key, value)?),
        "enableEncryption" => config.enable_encryption = Some(parse_bool(key, value)?),
        "identityRepo" | "githubRepo" => config.identity_repo = Some(value.to_string()),
        "additionalIdentityRepos" | "additionalGithubRepos" => {
            config.additional_identity_repos = Some(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|repo| !repo.is_empty())
                    .map(String::from)
                    .collect(),
            )
        }
        "account" => config.account = Some(value.to_string()),
        "region" => config.region = Some(value.to_string()),
        _ => {
            return Err(Error::invalid_configuration(format!(
                "Unknown setting '{}'",
                key
            )))
        }
    }
    Ok(())
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::invalid_configuration(format!(
            "{} must be true or false, got '{}'",
            key, value
        ))),
    }
}

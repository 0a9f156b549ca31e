//! Adapter configuration.
//!
//! Values come from an optional flat TOML file overlaid by the process
//! environment, so the same keys (`JIRA_BASE_URL`, `MYSQL_HOST`, ...) work in
//! both places. Nothing here is validated up front: each adapter asks for the
//! keys it needs on first use and gets a [`ConfigError`] naming what is absent.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variables: {}", .keys.join(", "))]
    Missing { keys: Vec<String> },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct ConfigSource {
    values: HashMap<String, String>,
}

impl ConfigSource {
    /// Load the optional file, then let environment variables win.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut source = match config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        source.values.extend(std::env::vars());
        Ok(source)
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Read a flat `KEY = value` TOML table. Non-string scalars are stringified.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let table: toml::Table = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file {}", path.display()))?;

        let mut values = HashMap::new();
        for (key, value) in table {
            let value = match value {
                toml::Value::String(s) => s,
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => anyhow::bail!(
                    "Configuration key {} must be a scalar, got {}",
                    key,
                    other.type_str()
                ),
            };
            values.insert(key, value);
        }

        Ok(Self { values })
    }

    /// Value for `key`. Empty strings count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// All of `keys`, or an error naming every one that is absent.
    pub fn require<'a>(&'a self, keys: &[&str]) -> Result<Vec<&'a str>, ConfigError> {
        let missing: Vec<String> = keys
            .iter()
            .filter(|k| self.get(k).is_none())
            .map(|k| k.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(ConfigError::Missing { keys: missing });
        }

        Ok(keys.iter().filter_map(|k| self.get(k)).collect())
    }

    /// Parse an optional numeric value, falling back to `default`.
    pub fn port_or(&self, key: &str, default: u16) -> Result<u16, ConfigError> {
        match self.get(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                reason: format!("expected a port number, got {:?}", raw),
            }),
        }
    }

    /// `true` only for the literal string "true".
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }
}

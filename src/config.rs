//! Resolved configuration snapshot
//!
//! This module provides [`ConfigView`], the read-only key/value view every
//! option builder inspects. Loading (flags, files, environment) happens
//! elsewhere; a loader only has to produce one of these, either directly or
//! through `serde`.
//!
//! Every accessor has a default for absent keys, so builders never have to
//! check for presence first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Configuration keys consumed by the built-in builders
pub mod keys {
    /// Target address of the remote server
    pub const SERVER: &str = "server";
    /// Require TLS
    pub const TLS: &str = "tls";
    /// Skip peer certificate verification
    pub const TLS_ALLOW_INSECURE: &str = "tls-allow-insecure";
    /// Server name used for SNI and certificate verification
    pub const TLS_SERVER_NAME: &str = "tls-server-name";
    /// Custom CA certificate files
    pub const TLS_CA_CERT_FILES: &str = "tls-ca-cert-files";
    /// Client certificate file for mTLS
    pub const TLS_CLIENT_CERT_FILE: &str = "tls-client-cert-file";
    /// Client private key file for mTLS
    pub const TLS_CLIENT_KEY_FILE: &str = "tls-client-key-file";
    /// User agent announced to the server
    pub const USER_AGENT: &str = "user-agent";
}

/// Raised when a key holds a value of the wrong shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for config key '{key}': {reason}")]
pub struct ConfigError {
    pub key: String,
    pub reason: String,
}

impl ConfigError {
    fn new(key: &str, reason: impl Into<String>) -> Self {
        ConfigError {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    String(String),
    List(Vec<String>),
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for ConfigValue {
    fn from(values: Vec<S>) -> Self {
        ConfigValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Read-only configuration snapshot for one connection attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigView {
    values: BTreeMap<String, ConfigValue>,
}

impl ConfigView {
    /// Create an empty view (every key takes its default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value while assembling the view
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Parse a view from a JSON object
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Raw value lookup
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Boolean value, `false` when absent
    ///
    /// String values are accepted when they spell a boolean
    /// (`true`, `false`, `1`, `0`, case-insensitive).
    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        match self.values.get(key) {
            None => Ok(false),
            Some(ConfigValue::Bool(b)) => Ok(*b),
            Some(ConfigValue::String(s)) => match s.trim().to_lowercase().as_str() {
                "" | "false" | "0" => Ok(false),
                "true" | "1" => Ok(true),
                other => Err(ConfigError::new(
                    key,
                    format!("expected a boolean, got '{}'", other),
                )),
            },
            Some(ConfigValue::List(_)) => {
                Err(ConfigError::new(key, "expected a boolean, got a list"))
            }
        }
    }

    /// String value, empty when absent
    pub fn get_string(&self, key: &str) -> Result<String, ConfigError> {
        match self.values.get(key) {
            None => Ok(String::new()),
            Some(ConfigValue::String(s)) => Ok(s.clone()),
            Some(ConfigValue::Bool(b)) => Ok(b.to_string()),
            Some(ConfigValue::List(_)) => {
                Err(ConfigError::new(key, "expected a string, got a list"))
            }
        }
    }

    /// String value, `None` when absent or empty
    pub fn get_opt_string(&self, key: &str) -> Result<Option<String>, ConfigError> {
        let value = self.get_string(key)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    /// Ordered list of strings, empty when absent
    ///
    /// A plain string is treated as a comma-separated list. Entries are
    /// trimmed and blank ones dropped in both forms.
    pub fn get_string_list(&self, key: &str) -> Result<Vec<String>, ConfigError> {
        let items: Vec<&str> = match self.values.get(key) {
            None => return Ok(Vec::new()),
            Some(ConfigValue::List(items)) => items.iter().map(String::as_str).collect(),
            Some(ConfigValue::String(s)) => s.split(',').collect(),
            Some(ConfigValue::Bool(_)) => {
                return Err(ConfigError::new(key, "expected a list of strings, got a boolean"))
            }
        };
        Ok(items
            .into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect())
    }
}

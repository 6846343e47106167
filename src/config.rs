//! Connection configuration
//!
//! A connection is described by an untyped key/value mapping, usually
//! loaded from YAML. [`ConnectionConfig`] keeps the raw mapping and exposes
//! typed accessors for the keys the factory understands:
//!
//! | key          | type                      | meaning                          |
//! |--------------|---------------------------|----------------------------------|
//! | `method`     | string                    | authentication method            |
//! | `token`      | string                    | credential                       |
//! | `sudo`       | string                    | user to impersonate              |
//! | `url`        | string                    | base URL of the GitLab instance  |
//! | `cache`      | bool or string            | default or named cache store     |
//! | `cache_ttl`  | integer (seconds)         | freshness of cached responses    |
//! | `backoff`    | bool or integer (retries) | retry/backoff decorator          |
//! | `rate_limit` | integer (requests/second) | throttling decorator             |

use crate::error::{Error, Result, ResultExt};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Default freshness of cached responses
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Name of the connection used when none is requested
pub const DEFAULT_CONNECTION: &str = "main";

// ============================================================================
// Connection Config
// ============================================================================

/// Configuration of a single connection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionConfig(JsonObject);

impl ConnectionConfig {
    /// Create an empty config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config from a JSON value, which must be an object
    pub fn from_value(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(Error::invalid_argument(format!(
                "The connection config must be a mapping, got {other}."
            ))),
        }
    }

    /// Set a key, returning the config for chaining
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Get the raw value of a key; `null` counts as absent
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Check whether a key is present and not `null`
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// The raw mapping
    pub fn as_map(&self) -> &JsonObject {
        &self.0
    }

    /// Authentication method name
    pub fn method(&self) -> Result<Option<&str>> {
        self.string("method")
    }

    /// Credential value
    pub fn token(&self) -> Result<Option<&str>> {
        self.string("token")
    }

    /// User to impersonate
    pub fn sudo(&self) -> Result<Option<&str>> {
        self.string("sudo")
    }

    /// Base URL override
    pub fn url(&self) -> Result<Option<&str>> {
        self.string("url")
    }

    /// Which cache store, if any, the connection wants
    pub fn cache(&self) -> Result<CacheSetting> {
        match self.get("cache") {
            None | Some(JsonValue::Bool(false)) => Ok(CacheSetting::Disabled),
            Some(JsonValue::Bool(true)) => Ok(CacheSetting::Default),
            Some(JsonValue::String(name)) => Ok(CacheSetting::Named(name.clone())),
            Some(_) => Err(type_error("cache", "a boolean or a store name")),
        }
    }

    /// How long cached responses stay fresh
    pub fn cache_ttl(&self) -> Result<Duration> {
        match self.get("cache_ttl") {
            None => Ok(DEFAULT_CACHE_TTL),
            Some(value) => value
                .as_u64()
                .map(Duration::from_secs)
                .ok_or_else(|| type_error("cache_ttl", "a number of seconds")),
        }
    }

    /// Retry/backoff setting; absent means the default policy
    pub fn backoff(&self) -> Result<BackoffSetting> {
        match self.get("backoff") {
            None | Some(JsonValue::Bool(true)) => Ok(BackoffSetting::Default),
            Some(JsonValue::Bool(false)) => Ok(BackoffSetting::Disabled),
            Some(JsonValue::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(BackoffSetting::Retries)
                .ok_or_else(|| type_error("backoff", "a boolean or a retry count")),
            Some(_) => Err(type_error("backoff", "a boolean or a retry count")),
        }
    }

    /// Requests per second allowed through the throttling decorator
    pub fn rate_limit(&self) -> Result<Option<u32>> {
        match self.get("rate_limit") {
            None => Ok(None),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .map(Some)
                .ok_or_else(|| type_error("rate_limit", "a positive number of requests")),
        }
    }

    fn string(&self, key: &str) -> Result<Option<&str>> {
        match self.get(key) {
            None => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(type_error(key, "a string")),
        }
    }
}

impl From<JsonObject> for ConnectionConfig {
    fn from(map: JsonObject) -> Self {
        Self(map)
    }
}

fn type_error(key: &str, expected: &str) -> Error {
    Error::invalid_argument(format!("The {key} option must be {expected}."))
}

/// Cache store requested by a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheSetting {
    /// No caching
    Disabled,
    /// The cache factory's default store
    Default,
    /// A store by name
    Named(String),
}

impl CacheSetting {
    /// Whether any store is requested
    pub fn is_enabled(&self) -> bool {
        !matches!(self, CacheSetting::Disabled)
    }

    /// Store name to ask the cache factory for (`None` = default store)
    pub fn store_name(&self) -> Option<&str> {
        match self {
            CacheSetting::Named(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Retry/backoff requested by a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffSetting {
    /// No retries
    Disabled,
    /// The default retry policy
    Default,
    /// The default policy with a custom number of retries
    Retries(u32),
}

// ============================================================================
// Connections File
// ============================================================================

/// A set of named connections, as found in a `gitlab.yaml` file
///
/// ```yaml
/// default: main
/// connections:
///   main:
///     method: token
///     token: your-token
///     cache: true
///   public:
///     method: none
///     url: https://gitlab.example.com
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionsConfig {
    /// Name of the default connection
    #[serde(default = "default_connection")]
    pub default: String,

    /// Connection configs by name
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

fn default_connection() -> String {
    DEFAULT_CONNECTION.to_string()
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            default: default_connection(),
            connections: HashMap::new(),
        }
    }
}

impl ConnectionsConfig {
    /// Parse from a YAML (or JSON) string
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Load from a YAML (or JSON) file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {e}", path.display()),
            ))
        })?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("Invalid connections file {}", path.display()))
    }

    /// Look up a connection by name
    pub fn get(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.get(name)
    }
}

//! Common types used throughout gitlab-factory
//!
//! This module contains shared type definitions, type aliases,
//! and constants used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// Defaults
// ============================================================================

/// Base URL used when a connection does not configure `url`
pub const DEFAULT_URL: &str = "https://gitlab.com";

/// Path prefix of the GitLab REST API
pub const API_PREFIX: &str = "api/v4";

/// Auth method used when nothing needs to be authenticated
pub const DEFAULT_METHOD: &str = "none";

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

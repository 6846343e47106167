//! Authenticator registry
//!
//! Maps method names, as they appear in connection configs, to
//! authenticators.

use super::authenticator::Authenticator;
use crate::types::DEFAULT_METHOD;
use std::collections::HashMap;

static NO_AUTH: Authenticator = Authenticator::None;

/// Method names known out of the box
const BUILTIN: [(&str, Authenticator); 5] = [
    ("none", Authenticator::None),
    ("token", Authenticator::Oauth),
    ("oauth", Authenticator::Oauth),
    ("http_token", Authenticator::PrivateToken),
    ("job_token", Authenticator::JobToken),
];

/// Registry of authenticators by method name
#[derive(Debug, Clone)]
pub struct AuthenticatorRegistry {
    authenticators: HashMap<String, Authenticator>,
}

impl AuthenticatorRegistry {
    /// Create a registry with the built-in methods
    pub fn new() -> Self {
        Self::from_pairs(BUILTIN)
    }

    /// Create a registry from `(name, authenticator)` pairs
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Authenticator)>,
        S: Into<String>,
    {
        Self {
            authenticators: pairs
                .into_iter()
                .map(|(name, auth)| (name.into(), auth))
                .collect(),
        }
    }

    /// Register an authenticator, returning the one it replaced
    pub fn register(
        &mut self,
        name: impl Into<String>,
        authenticator: Authenticator,
    ) -> Option<Authenticator> {
        self.authenticators.insert(name.into(), authenticator)
    }

    /// Resolve a method name
    ///
    /// `"none"` always resolves to the no-op authenticator. Any other
    /// unknown name yields `None`.
    pub fn resolve(&self, method: &str) -> Option<&Authenticator> {
        self.authenticators
            .get(method)
            .or_else(|| (method == DEFAULT_METHOD).then_some(&NO_AUTH))
    }

    /// Registered method names, sorted
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.authenticators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for AuthenticatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Credential types
//!
//! These types describe the credentials applied to a client after an
//! authenticator has validated its configuration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of credential attached to a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// OAuth access token, sent as `Authorization: Bearer`
    OauthToken,
    /// Personal/project access token, sent as `PRIVATE-TOKEN`
    HttpToken,
    /// CI job token, sent as `JOB-TOKEN`
    #[serde(rename = "http_job_token")]
    JobToken,
}

impl AuthKind {
    /// Wire name of the credential kind
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::OauthToken => "oauth_token",
            AuthKind::HttpToken => "http_token",
            AuthKind::JobToken => "http_job_token",
        }
    }

    /// Header name and value carrying a token of this kind
    pub fn header(&self, token: &str) -> (&'static str, String) {
        match self {
            AuthKind::OauthToken => ("Authorization", format!("Bearer {token}")),
            AuthKind::HttpToken => ("PRIVATE-TOKEN", token.to_string()),
            AuthKind::JobToken => ("JOB-TOKEN", token.to_string()),
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials applied to a client
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// The secret token
    pub token: String,
    /// How the token is sent
    pub kind: AuthKind,
    /// User to act on behalf of
    pub sudo: Option<String>,
}

impl Credentials {
    /// Create new credentials
    pub fn new(token: impl Into<String>, kind: AuthKind, sudo: Option<String>) -> Self {
        Self {
            token: token.into(),
            kind,
            sudo,
        }
    }

    /// Headers to attach to each request
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![self.kind.header(&self.token)];
        if let Some(sudo) = &self.sudo {
            headers.push(("Sudo", sudo.clone()));
        }
        headers
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("kind", &self.kind)
            .field("sudo", &self.sudo)
            .finish()
    }
}

//! Authenticator implementation
//!
//! Each authenticator validates the credential fields of a connection
//! config and applies them to a [`Client`]. The target client travels with
//! the call: either directly through [`Authenticator::authenticate_client`]
//! or through an [`Authentication`] context created by
//! [`Authenticator::with`].

use super::types::AuthKind;
use crate::client::Client;
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use tracing::debug;

/// Authentication strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Authenticator {
    /// No credentials
    None,
    /// OAuth access token
    Oauth,
    /// Personal, project or group access token
    PrivateToken,
    /// CI job token
    JobToken,
}

impl Authenticator {
    /// Human readable name, as used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Authenticator::None => "none",
            Authenticator::Oauth => "oauth",
            Authenticator::PrivateToken => "private token",
            Authenticator::JobToken => "job token",
        }
    }

    /// Credential kind produced by this authenticator
    pub fn kind(&self) -> Option<AuthKind> {
        match self {
            Authenticator::None => None,
            Authenticator::Oauth => Some(AuthKind::OauthToken),
            Authenticator::PrivateToken => Some(AuthKind::HttpToken),
            Authenticator::JobToken => Some(AuthKind::JobToken),
        }
    }

    /// Start an authentication of the given client
    pub fn with(&self, client: Client) -> Authentication<'_> {
        Authentication::new(self).with(client)
    }

    /// Validate `config` and apply its credentials to `client`
    ///
    /// Nothing is applied when validation fails.
    pub fn authenticate_client(&self, mut client: Client, config: &ConnectionConfig) -> Result<Client> {
        let Some(kind) = self.kind() else {
            return Ok(client);
        };

        let token = config.token()?.ok_or_else(|| {
            Error::invalid_argument(format!(
                "The {} authenticator requires a token.",
                self.name()
            ))
        })?;
        let sudo = config.sudo()?.map(String::from);

        debug!(
            authenticator = self.name(),
            kind = %kind,
            sudo = sudo.as_deref().unwrap_or(""),
            "Applying credentials"
        );
        client.authenticate(token, kind, sudo);

        Ok(client)
    }
}

/// A single authentication call
///
/// Holds the client to authenticate for the duration of one call, so an
/// [`Authenticator`] itself never carries per-call state.
#[derive(Debug)]
pub struct Authentication<'a> {
    authenticator: &'a Authenticator,
    client: Option<Client>,
}

impl<'a> Authentication<'a> {
    /// Create an authentication with no client bound yet
    pub fn new(authenticator: &'a Authenticator) -> Self {
        Self {
            authenticator,
            client: None,
        }
    }

    /// Bind the client to authenticate, replacing any earlier one
    #[must_use]
    pub fn with(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Authenticate the bound client
    pub fn authenticate(self, config: &ConnectionConfig) -> Result<Client> {
        let client = self.client.ok_or_else(|| {
            Error::invalid_argument("The client instance was not given to the authenticator.")
        })?;

        self.authenticator.authenticate_client(client, config)
    }
}

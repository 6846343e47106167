//! GitLab API client
//!
//! The client the factory produces. It owns its HTTP methods client, which
//! in turn owns the (possibly decorated) transport.

use crate::auth::{AuthKind, Credentials};
use crate::error::Result;
use crate::http::{HttpMethodsClient, LayerKind, Pipeline, ReqwestTransport, DEFAULT_TIMEOUT};
use crate::types::DEFAULT_URL;
use std::sync::Arc;
use url::Url;

/// User agent sent with every request
pub fn user_agent() -> String {
    format!("{}/{}", crate::NAME, crate::VERSION)
}

/// GitLab API client
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpMethodsClient,
}

impl Client {
    /// Create a client for gitlab.com
    pub fn new() -> Result<Self> {
        Self::with_url(DEFAULT_URL)
    }

    /// Create a client for the instance at `url`
    pub fn with_url(url: &str) -> Result<Self> {
        let base_url = Url::parse(url)?;
        let transport = ReqwestTransport::new(&user_agent(), DEFAULT_TIMEOUT)?;
        Ok(Self::from_http(HttpMethodsClient::new(Arc::new(transport), base_url)))
    }

    /// Create a client over an existing HTTP methods client
    pub fn from_http(http: HttpMethodsClient) -> Self {
        Self { http }
    }

    /// Attach credentials to every subsequent request
    pub fn authenticate(&mut self, token: impl Into<String>, kind: AuthKind, sudo: Option<String>) {
        self.http.set_credentials(Credentials::new(token, kind, sudo));
    }

    /// Credentials in use, if any
    pub fn credentials(&self) -> Option<&Credentials> {
        self.http.credentials()
    }

    /// Point the client at another instance
    pub fn set_url(&mut self, url: &str) -> Result<()> {
        self.http.set_base_url(Url::parse(url)?);
        Ok(())
    }

    /// Base URL of the instance
    pub fn base_url(&self) -> &Url {
        self.http.base_url()
    }

    /// The HTTP client requests go through
    pub fn http_client(&self) -> &HttpMethodsClient {
        &self.http
    }

    /// Wrap the current transport in the layers of `pipeline`
    ///
    /// Layers already installed stay innermost.
    pub fn decorate(&mut self, pipeline: Pipeline) {
        if pipeline.is_empty() {
            return;
        }
        let (transport, applied) = pipeline.apply(self.http.transport().clone());
        let mut layers: Vec<LayerKind> = self.http.layers().to_vec();
        layers.extend(applied);
        self.http.set_transport(transport, layers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{BackoffPolicy, Layer};

    #[test]
    fn test_default_url() {
        let client = Client::new().unwrap();
        assert_eq!(client.base_url().as_str(), "https://gitlab.com/");
        assert!(client.credentials().is_none());
        assert!(client.http_client().layers().is_empty());
    }

    #[test]
    fn test_invalid_url() {
        let err = Client::with_url("not a url").unwrap_err();
        assert!(matches!(err, crate::Error::InvalidUrl(_)));
    }

    #[test]
    fn test_set_url() {
        let mut client = Client::new().unwrap();
        client.set_url("https://api.example.com").unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/");
    }

    #[test]
    fn test_authenticate() {
        let mut client = Client::new().unwrap();
        client.authenticate("t", AuthKind::OauthToken, Some("s".into()));

        let creds = client.credentials().unwrap();
        assert_eq!(creds.token, "t");
        assert_eq!(creds.kind, AuthKind::OauthToken);
        assert_eq!(creds.sudo.as_deref(), Some("s"));
    }

    #[test]
    fn test_decorate() {
        let mut client = Client::new().unwrap();
        client.decorate(Pipeline::new());
        assert!(client.http_client().layers().is_empty());

        client.decorate(Pipeline::new().with(Layer::Backoff(BackoffPolicy::default())));
        assert_eq!(client.http_client().layers(), &[LayerKind::Backoff]);
    }

    #[test]
    fn test_user_agent() {
        assert!(user_agent().starts_with("gitlab-factory/"));
    }
}

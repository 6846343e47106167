//! HTTP methods client
//!
//! Front end of a client's transport pipeline. Resolves API paths against
//! the base URL, attaches credentials and default headers, and dispatches
//! through whatever decorators the factory installed.

use super::pipeline::LayerKind;
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::types::API_PREFIX;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP client bound to a GitLab instance
#[derive(Clone)]
pub struct HttpMethodsClient {
    transport: Arc<dyn Transport>,
    base_url: Url,
    credentials: Option<Credentials>,
    default_headers: HashMap<String, String>,
    layers: Vec<LayerKind>,
}

impl HttpMethodsClient {
    /// Create a client over an undecorated transport
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
            credentials: None,
            default_headers: HashMap::new(),
            layers: Vec::new(),
        }
    }

    /// Base URL of the instance
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn set_base_url(&mut self, url: Url) {
        self.base_url = url;
    }

    /// Credentials attached to every request
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub(crate) fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Add a header sent with every request
    pub fn set_default_header(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.default_headers.insert(key.into(), value.into());
    }

    /// Decorators around the transport, innermost first
    pub fn layers(&self) -> &[LayerKind] {
        &self.layers
    }

    /// Whether a decorator of the given kind is installed
    pub fn has_layer(&self, kind: LayerKind) -> bool {
        self.layers.contains(&kind)
    }

    pub(crate) fn set_transport(&mut self, transport: Arc<dyn Transport>, layers: Vec<LayerKind>) {
        self.transport = transport;
        self.layers = layers;
    }

    /// The outermost transport
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<HttpResponse> {
        self.request(Method::GET, path, RequestConfig::default())
            .await
    }

    /// Make a GET request with config
    pub async fn get_with_config(&self, path: &str, config: RequestConfig) -> Result<HttpResponse> {
        self.request(Method::GET, path, config).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: Value) -> Result<HttpResponse> {
        self.request(Method::POST, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a PUT request
    pub async fn put(&self, path: &str, body: Value) -> Result<HttpResponse> {
        self.request(Method::PUT, path, RequestConfig::default().json(body))
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<HttpResponse> {
        self.request(Method::DELETE, path, RequestConfig::default())
            .await
    }

    /// Make a generic request
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<HttpResponse> {
        let request = self.build_request(method, path, config)?;
        debug!("{} {}", request.method, request.url);
        self.transport.send(request).await
    }

    /// Make a request and parse a successful JSON response
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        self.request(method, path, config)
            .await?
            .error_for_status()?
            .json()
    }

    /// Make a GET request and parse JSON response
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request_json(Method::GET, path, RequestConfig::default())
            .await
    }

    /// Build the request that would be dispatched
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<HttpRequest> {
        let mut url = self.build_url(path)?;
        if !config.query.is_empty() {
            let mut pairs: Vec<_> = config.query.iter().collect();
            pairs.sort();
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let mut request = HttpRequest::new(method, url);
        request.timeout = config.timeout;

        for (key, value) in &self.default_headers {
            request = request.header(key, value)?;
        }

        // Credentials only go to the configured instance
        if let Some(credentials) = &self.credentials {
            if request.url.origin() == self.base_url.origin() {
                for (key, value) in credentials.headers() {
                    request = request.header(key, &value)?;
                }
            } else {
                warn!(
                    host = request.url.host_str().unwrap_or(""),
                    "Not sending credentials to a foreign origin"
                );
            }
        }

        for (key, value) in &config.headers {
            request = request.header(key, value)?;
        }

        if let Some(body) = &config.body {
            request = request.json(body)?;
        }

        Ok(request)
    }

    /// Resolve an API path to a full URL
    ///
    /// Absolute URLs are used as-is; anything else is taken relative to
    /// `<base_url>/api/v4/`. Absolute URLs on another origin are sent
    /// without credentials.
    pub fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Url::parse(&format!("{base}/{API_PREFIX}/{path}")).map_err(Error::from)
    }
}

impl std::fmt::Debug for HttpMethodsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMethodsClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}

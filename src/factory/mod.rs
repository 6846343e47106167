//! Client factory
//!
//! Turns a [`ConnectionConfig`] into a ready-to-use [`Client`]:
//!
//! 1. resolve the `method` through the authenticator registry
//! 2. build the base client for `url` (or the default URL)
//! 3. authenticate it
//! 4. decorate its transport per `rate_limit`, `cache` and `backoff`
//!
//! Checks fail in that order, so a missing method is reported before an
//! unknown one, and a missing token before unavailable caching.

use crate::auth::AuthenticatorRegistry;
use crate::cache::CacheFactory;
use crate::client::Client;
use crate::config::{BackoffSetting, ConnectionConfig};
use crate::error::{Error, Result};
use crate::http::{BackoffPolicy, Layer, Pipeline, RateLimiterConfig};
use crate::types::DEFAULT_URL;
use std::sync::Arc;
use tracing::debug;

/// Builds authenticated, decorated clients from connection configs
#[derive(Debug, Clone)]
pub struct ClientFactory {
    registry: AuthenticatorRegistry,
    cache: Option<Arc<dyn CacheFactory>>,
    default_url: String,
    backoff: BackoffPolicy,
}

impl ClientFactory {
    /// Create a factory
    ///
    /// Without a cache factory, any config asking for a cache is rejected.
    pub fn new(registry: AuthenticatorRegistry, cache: Option<Arc<dyn CacheFactory>>) -> Self {
        Self {
            registry,
            cache,
            default_url: DEFAULT_URL.to_string(),
            backoff: BackoffPolicy::default(),
        }
    }

    /// Base URL for configs without `url`
    #[must_use]
    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = url.into();
        self
    }

    /// Policy used when `backoff` is enabled
    #[must_use]
    pub fn with_backoff_policy(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    /// The authenticator registry
    pub fn registry(&self) -> &AuthenticatorRegistry {
        &self.registry
    }

    /// Whether a cache factory was provided
    pub fn has_cache(&self) -> bool {
        self.cache.is_some()
    }

    /// Make a new client
    pub fn make(&self, config: &ConnectionConfig) -> Result<Client> {
        let method = config
            .method()?
            .ok_or_else(|| Error::invalid_argument("The gitlab factory requires an auth method."))?;

        let authenticator = self.registry.resolve(method).ok_or_else(|| {
            Error::invalid_argument(format!("Unsupported authentication method [{method}]."))
        })?;

        let url = config.url()?.unwrap_or(&self.default_url);
        let client = Client::with_url(url)?;

        let mut client = authenticator.with(client).authenticate(config)?;

        let pipeline = self.pipeline(config)?;
        debug!(
            method = method,
            url = url,
            layers = ?pipeline.kinds(),
            "Built gitlab client"
        );
        client.decorate(pipeline);

        Ok(client)
    }

    /// Collect the decorators a config asks for
    fn pipeline(&self, config: &ConnectionConfig) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new();

        if let Some(rps) = config.rate_limit()? {
            pipeline.push(Layer::RateLimit(RateLimiterConfig::per_second(rps)));
        }

        match config.backoff()? {
            BackoffSetting::Disabled => {}
            BackoffSetting::Default => pipeline.push(Layer::Backoff(self.backoff.clone())),
            BackoffSetting::Retries(max_retries) => pipeline.push(Layer::Backoff(BackoffPolicy {
                max_retries,
                ..self.backoff.clone()
            })),
        }

        let cache = config.cache()?;
        if cache.is_enabled() {
            let factory = self
                .cache
                .as_ref()
                .ok_or_else(|| Error::invalid_argument("Caching support not available."))?;
            let store = factory.store(cache.store_name())?;
            pipeline.push(Layer::Cache {
                store,
                ttl: config.cache_ttl()?,
            });
        }

        Ok(pipeline)
    }
}

impl Default for ClientFactory {
    fn default() -> Self {
        Self::new(AuthenticatorRegistry::new(), None)
    }
}

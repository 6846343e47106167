//! Decorator pipeline
//!
//! Layers are collected in any order and always applied in
//! [`PIPELINE_ORDER`], innermost first:
//!
//! ```text
//! transport → rate limit → cache → backoff
//! ```
//!
//! Backoff is outermost so that a retry goes through the cache and the
//! rate limiter again; cache hits never consume rate limit permits.

use super::backoff::{BackoffLayer, BackoffPolicy};
use super::rate_limit::{RateLimitLayer, RateLimiterConfig};
use super::transport::Transport;
use crate::cache::{CacheLayer, CacheRepository};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Kind of decorator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Token bucket throttling
    RateLimit,
    /// Response cache
    Cache,
    /// Retry with backoff
    Backoff,
}

/// Order in which layers wrap the transport, innermost first
pub const PIPELINE_ORDER: [LayerKind; 3] = [LayerKind::RateLimit, LayerKind::Cache, LayerKind::Backoff];

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayerKind::RateLimit => "rate_limit",
            LayerKind::Cache => "cache",
            LayerKind::Backoff => "backoff",
        })
    }
}

/// A decorator waiting to be applied
#[derive(Debug, Clone)]
pub enum Layer {
    /// Throttle dispatch
    RateLimit(RateLimiterConfig),
    /// Cache responses in a store
    Cache {
        /// Store to keep responses in
        store: Arc<dyn CacheRepository>,
        /// Freshness of stored responses
        ttl: Duration,
    },
    /// Retry failed requests
    Backoff(BackoffPolicy),
}

impl Layer {
    /// Kind of this layer
    pub fn kind(&self) -> LayerKind {
        match self {
            Layer::RateLimit(_) => LayerKind::RateLimit,
            Layer::Cache { .. } => LayerKind::Cache,
            Layer::Backoff(_) => LayerKind::Backoff,
        }
    }

    fn wrap(self, inner: Arc<dyn Transport>) -> Arc<dyn Transport> {
        match self {
            Layer::RateLimit(config) => Arc::new(RateLimitLayer::new(inner, &config)),
            Layer::Cache { store, ttl } => Arc::new(CacheLayer::new(inner, store, ttl)),
            Layer::Backoff(policy) => Arc::new(BackoffLayer::new(inner, policy)),
        }
    }
}

/// Ordered set of layers, at most one per kind
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    layers: Vec<Layer>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer, replacing any layer of the same kind
    pub fn push(&mut self, layer: Layer) {
        self.layers.retain(|l| l.kind() != layer.kind());
        self.layers.push(layer);
    }

    /// Add a layer, returning the pipeline for chaining
    #[must_use]
    pub fn with(mut self, layer: Layer) -> Self {
        self.push(layer);
        self
    }

    /// Whether no layers were added
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer kinds in application order
    pub fn kinds(&self) -> Vec<LayerKind> {
        PIPELINE_ORDER
            .into_iter()
            .filter(|kind| self.layers.iter().any(|l| l.kind() == *kind))
            .collect()
    }

    /// Wrap `base` in every layer, returning the outermost transport and
    /// the applied kinds
    pub fn apply(mut self, base: Arc<dyn Transport>) -> (Arc<dyn Transport>, Vec<LayerKind>) {
        let mut transport = base;
        let mut applied = Vec::with_capacity(self.layers.len());

        for kind in PIPELINE_ORDER {
            if let Some(pos) = self.layers.iter().position(|l| l.kind() == kind) {
                transport = self.layers.swap_remove(pos).wrap(transport);
                applied.push(kind);
            }
        }

        (transport, applied)
    }
}

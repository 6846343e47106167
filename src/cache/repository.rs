//! Cache store contracts
//!
//! A [`CacheFactory`] hands out [`CacheRepository`] stores by name. Stores
//! are plain key/value containers with expiry; the response cache decorator
//! decides what goes in them.

use crate::error::Result;
use crate::http::HttpResponse;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Key/value store for cached responses
#[async_trait]
pub trait CacheRepository: Send + Sync + Debug {
    /// Fetch a fresh entry
    async fn get(&self, key: &str) -> Result<Option<HttpResponse>>;

    /// Store an entry for `ttl`
    async fn put(&self, key: &str, response: HttpResponse, ttl: Duration) -> Result<()>;

    /// Remove an entry, returning whether it existed
    async fn forget(&self, key: &str) -> Result<bool>;
}

/// Source of cache stores
pub trait CacheFactory: Send + Sync + Debug {
    /// Get a store by name, or the default store for `None`
    fn store(&self, name: Option<&str>) -> Result<Arc<dyn CacheRepository>>;
}

/// Cached response with expiration
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored response
    pub response: HttpResponse,
    /// When the entry expires
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry that expires `ttl` from now
    pub fn new(response: HttpResponse, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            response,
            expires_at,
        }
    }

    /// Check if the entry is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

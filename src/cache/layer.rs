//! Response cache decorator
//!
//! Serves repeated `GET` and `HEAD` requests from a cache store. Entries are
//! keyed by method, URL and a hash of the credential headers, so two users
//! of the same store never see each other's responses. A write to a URL
//! evicts its entries.

use super::repository::CacheRepository;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse, Transport};
use async_trait::async_trait;
use reqwest::Method;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Headers that identify who is asking
const CREDENTIAL_HEADERS: [&str; 4] = ["authorization", "private-token", "job-token", "sudo"];

/// Transport decorator that caches successful `GET` and `HEAD` responses
#[derive(Debug)]
pub struct CacheLayer {
    inner: Arc<dyn Transport>,
    store: Arc<dyn CacheRepository>,
    ttl: Duration,
}

impl CacheLayer {
    /// Wrap a transport
    pub fn new(inner: Arc<dyn Transport>, store: Arc<dyn CacheRepository>, ttl: Duration) -> Self {
        Self { inner, store, ttl }
    }

    /// Freshness of stored responses
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[async_trait]
impl Transport for CacheLayer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        if !request.is_safe() {
            let mutating = request.method != Method::OPTIONS;
            let keys = [
                key_for(&Method::GET, &request),
                key_for(&Method::HEAD, &request),
            ];
            // A failed write may still have reached the server
            let result = self.inner.send(request).await;
            if mutating {
                for key in &keys {
                    match self.store.forget(key).await {
                        Ok(true) => debug!(key = %key, "Evicted cached response"),
                        Ok(false) => {}
                        Err(e) => warn!(key = %key, "Failed to evict cached response: {}", e),
                    }
                }
            }
            return result;
        }

        let key = cache_key(&request);

        // Store failures degrade to a cache miss
        match self.store.get(&key).await {
            Ok(Some(cached)) => {
                debug!(key = %key, "Serving response from cache");
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!(key = %key, "Failed to read cache: {}", e),
        }

        let response = self.inner.send(request).await?;

        if response.is_success() && is_storable(&response) {
            if let Err(e) = self.store.put(&key, response.clone(), self.ttl).await {
                warn!(key = %key, "Failed to cache response: {}", e);
            }
        }

        Ok(response)
    }
}

/// Build the cache key for a request
pub fn cache_key(request: &HttpRequest) -> String {
    key_for(&request.method, request)
}

fn key_for(method: &Method, request: &HttpRequest) -> String {
    let mut hasher = Sha256::new();
    for name in CREDENTIAL_HEADERS {
        if let Some(value) = request.headers.get(name) {
            hasher.update(name.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
    }
    format!("gitlab:{:x}:{}:{}", hasher.finalize(), method, request.url)
}

fn is_storable(response: &HttpResponse) -> bool {
    !response
        .header("cache-control")
        .is_some_and(|v| v.to_ascii_lowercase().contains("no-store"))
}

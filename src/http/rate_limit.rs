//! Rate limiting decorator
//!
//! Uses the governor crate for token bucket rate limiting.

use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::Result;
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as Governor};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Configuration for rate limiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Maximum number of requests per second
    pub requests_per_second: u32,
    /// Burst size (max tokens in bucket)
    pub burst_size: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl RateLimiterConfig {
    /// Create a new rate limiter config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }

    /// Config allowing `requests_per_second` with an equal burst
    pub fn per_second(requests_per_second: u32) -> Self {
        Self::new(requests_per_second, requests_per_second)
    }
}

/// Token bucket rate limiter
#[derive(Clone)]
pub struct RateLimiter {
    limiter: Arc<Governor<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config
    pub fn new(config: &RateLimiterConfig) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: Arc::new(Governor::direct(quota)),
        }
    }

    /// Wait until a request can be made
    pub async fn wait(&self) {
        self.limiter.until_ready().await;
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish()
    }
}

/// Transport decorator that throttles dispatch
#[derive(Debug)]
pub struct RateLimitLayer {
    inner: Arc<dyn Transport>,
    limiter: RateLimiter,
}

impl RateLimitLayer {
    /// Wrap a transport
    pub fn new(inner: Arc<dyn Transport>, config: &RateLimiterConfig) -> Self {
        Self {
            inner,
            limiter: RateLimiter::new(config),
        }
    }
}

#[async_trait]
impl Transport for RateLimitLayer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.limiter.wait().await;
        self.inner.send(request).await
    }
}

#[cfg(test)]
mod rate_limit_tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rate_limiter_config_default() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.burst_size, 10);
    }

    #[test]
    fn test_rate_limiter_config_per_second() {
        let config = RateLimiterConfig::per_second(50);
        assert_eq!(config.requests_per_second, 50);
        assert_eq!(config.burst_size, 50);
    }

    #[derive(Debug)]
    struct OkTransport;

    #[async_trait]
    impl Transport for OkTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Ok(HttpResponse::new(
                reqwest::StatusCode::OK,
                reqwest::header::HeaderMap::new(),
                "",
            ))
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::new(
            reqwest::Method::GET,
            url::Url::parse("https://gitlab.com/api/v4/version").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_rate_limit_layer_allows_burst_then_waits() {
        let layer = RateLimitLayer::new(Arc::new(OkTransport), &RateLimiterConfig::new(1, 2));

        for _ in 0..2 {
            let sent = tokio::time::timeout(Duration::from_millis(100), layer.send(request())).await;
            assert!(sent.is_ok());
        }

        let blocked = tokio::time::timeout(Duration::from_millis(100), layer.send(request())).await;
        assert!(blocked.is_err());
    }

    #[tokio::test]
    async fn test_rate_limit_layer_zero_is_clamped() {
        let layer = RateLimitLayer::new(Arc::new(OkTransport), &RateLimiterConfig::new(0, 0));

        let sent = tokio::time::timeout(Duration::from_millis(100), layer.send(request())).await;
        assert_eq!(sent.unwrap().unwrap().status, 200);
    }
}

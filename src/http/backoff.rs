//! Retry/backoff decorator
//!
//! Re-issues requests that failed with a retryable status (429, 5xx and
//! Cloudflare 52x), a timeout or a connection error.

use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::{is_retryable_status, Result};
use crate::types::BackoffType;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Maximum number of retries (total attempts = retries + 1)
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff_type: BackoffType::Exponential,
        }
    }
}

impl BackoffPolicy {
    /// Default policy with a custom number of retries
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Set the backoff curve
    #[must_use]
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.backoff_type = backoff_type;
        self.initial_backoff = initial;
        self.max_backoff = max;
        self
    }

    /// Calculate backoff delay for a given attempt (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.backoff_type {
            BackoffType::Constant => self.initial_backoff,
            BackoffType::Linear => self.initial_backoff.saturating_mul(attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.max_backoff)
    }
}

/// Transport decorator that retries failed requests
#[derive(Debug)]
pub struct BackoffLayer {
    inner: Arc<dyn Transport>,
    policy: BackoffPolicy,
}

impl BackoffLayer {
    /// Wrap a transport
    pub fn new(inner: Arc<dyn Transport>, policy: BackoffPolicy) -> Self {
        Self { inner, policy }
    }

    /// The retry policy in use
    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    fn delay_after(&self, response: &HttpResponse, attempt: u32) -> Duration {
        if response.status == StatusCode::TOO_MANY_REQUESTS {
            if let Some(secs) = retry_after(response) {
                return std::cmp::min(Duration::from_secs(secs), self.policy.max_backoff);
            }
        }
        self.policy.delay_for(attempt)
    }
}

#[async_trait]
impl Transport for BackoffLayer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let max_retries = self.policy.max_retries;
        let mut attempt = 0;

        loop {
            match self.inner.send(request.clone()).await {
                Ok(response) => {
                    let status = response.status.as_u16();
                    if is_retryable_status(status) && attempt < max_retries {
                        let delay = self.delay_after(&response, attempt);
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status,
                            attempt + 1,
                            max_retries.saturating_add(1),
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    if attempt > 0 {
                        debug!(
                            "{} {} finished with {} after {} retries",
                            request.method, request.url, status, attempt
                        );
                    }
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        "Request error ({}), attempt {}/{}, retrying in {:?}",
                        e,
                        attempt + 1,
                        max_retries.saturating_add(1),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Extract retry-after header value in seconds
fn retry_after(response: &HttpResponse) -> Option<u64> {
    response
        .header("retry-after")
        .and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod backoff_tests {
    use super::*;

    #[test]
    fn test_policy_default() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff_type, BackoffType::Exponential);
    }

    #[test]
    fn test_exponential_delay() {
        let policy = BackoffPolicy::default().backoff(
            BackoffType::Exponential,
            Duration::from_millis(100),
            Duration::from_secs(10),
        );

        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for(3), Duration::from_millis(800));
    }

    #[test]
    fn test_linear_and_constant_delay() {
        let linear = BackoffPolicy::default().backoff(
            BackoffType::Linear,
            Duration::from_millis(100),
            Duration::from_secs(10),
        );
        assert_eq!(linear.delay_for(0), Duration::from_millis(100));
        assert_eq!(linear.delay_for(2), Duration::from_millis(300));

        let constant = BackoffPolicy::default().backoff(
            BackoffType::Constant,
            Duration::from_millis(250),
            Duration::from_secs(10),
        );
        assert_eq!(constant.delay_for(5), Duration::from_millis(250));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = BackoffPolicy::default().backoff(
            BackoffType::Exponential,
            Duration::from_millis(100),
            Duration::from_millis(500),
        );
        assert_eq!(policy.delay_for(10), Duration::from_millis(500));
        assert_eq!(policy.delay_for(40), Duration::from_millis(500));
    }

    #[test]
    fn test_with_retries() {
        assert_eq!(BackoffPolicy::with_retries(7).max_retries, 7);
    }
}

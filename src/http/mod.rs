//! HTTP module
//!
//! Provides the transport pipeline a client dispatches through.
//!
//! # Features
//!
//! - **Transport**: request-in, response-out trait with a reqwest backend
//! - **Backoff**: retries with constant, linear or exponential delay
//! - **Rate Limiting**: token bucket rate limiter using governor
//! - **Pipeline**: fixed-order assembly of decorators

mod backoff;
mod client;
mod pipeline;
mod rate_limit;
mod transport;

pub use backoff::{BackoffLayer, BackoffPolicy};
pub use client::{HttpMethodsClient, RequestConfig};
pub use pipeline::{Layer, LayerKind, Pipeline, PIPELINE_ORDER};
pub use rate_limit::{RateLimitLayer, RateLimiter, RateLimiterConfig};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, DEFAULT_TIMEOUT};

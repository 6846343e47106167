// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # GitLab Client Factory
//!
//! Builds configured GitLab API clients from per-connection settings.
//!
//! ## Features
//!
//! - **Pluggable Auth**: OAuth token, private token, CI job token, or none,
//!   resolved by name through a registry
//! - **Response Caching**: GET responses cached in a named store
//! - **Backoff**: retries on transient failures
//! - **Rate Limiting**: token bucket throttling per client
//! - **Named Connections**: lazily built clients from a YAML file
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gitlab_factory::{ClientFactory, ConnectionConfig, Result};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let factory = ClientFactory::default();
//!     let config = ConnectionConfig::from_value(json!({
//!         "method": "token",
//!         "token": "glpat-...",
//!         "backoff": true,
//!     }))?;
//!
//!     let client = factory.make(&config)?;
//!     let projects = client.http_client().get_json("projects").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     ConnectionManager                        │
//! │        connection(name) → Client    reconnect / disconnect   │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       ClientFactory                          │
//! │  make(config) → resolve method → authenticate → decorate     │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬───────────────┴──────────────┬────────────────┐
//! │     Auth     │            HTTP              │     Cache      │
//! ├──────────────┼──────────────────────────────┼────────────────┤
//! │ Registry     │ Transport (reqwest)          │ CacheFactory   │
//! │ OAuth token  │ RateLimit → Cache → Backoff  │ MemoryStore    │
//! │ Private token│ HttpMethodsClient            │ CacheLayer     │
//! │ Job token    │                              │                │
//! └──────────────┴──────────────────────────────┴────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and constants
pub mod types;

/// Connection configuration
pub mod config;

/// Authenticators and their registry
pub mod auth;

/// HTTP transport, decorators and methods client
pub mod http;

/// Response cache stores and decorator
pub mod cache;

/// GitLab API client
pub mod client;

/// Client factory
pub mod factory;

/// Named connections
pub mod manager;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use auth::{AuthKind, Authenticator, AuthenticatorRegistry};
pub use cache::{CacheFactory, CacheManager, CacheRepository, MemoryStore};
pub use client::Client;
pub use config::{ConnectionConfig, ConnectionsConfig};
pub use factory::ClientFactory;
pub use http::LayerKind;
pub use manager::ConnectionManager;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

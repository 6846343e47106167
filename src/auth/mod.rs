//! Authentication module
//!
//! Supports: OAuth token, private (personal access) token, CI job token, none
//!
//! The `AuthenticatorRegistry` resolves a method name from a connection
//! config to an `Authenticator`, which validates the config and applies
//! the credentials to a client.

mod authenticator;
mod registry;
mod types;

pub use authenticator::{Authentication, Authenticator};
pub use registry::AuthenticatorRegistry;
pub use types::{AuthKind, Credentials};

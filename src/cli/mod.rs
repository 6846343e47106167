//! CLI module
//!
//! Command-line interface for building connections.
//!
//! # Commands
//!
//! - `inspect` - Build a connection and describe its client
//! - `get` - Send a GET request through a connection
//! - `methods` - List supported authentication methods

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;

//! CLI runner - executes commands

use crate::auth::AuthenticatorRegistry;
use crate::cache::CacheManager;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::client::Client;
use crate::error::Result;
use crate::factory::ClientFactory;
use crate::http::RequestConfig;
use crate::manager::ConnectionManager;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Inspect => self.inspect(),
            Commands::Get { path, query } => self.get(path, query).await,
            Commands::Methods => {
                self.output_message(&json!({ "methods": Self::factory().registry().methods() }));
                Ok(())
            }
        }
    }

    /// Factory with the built-in methods and an in-memory cache
    fn factory() -> ClientFactory {
        ClientFactory::new(
            AuthenticatorRegistry::new(),
            Some(Arc::new(CacheManager::new())),
        )
    }

    /// Load the connections file
    fn load_manager(&self) -> Result<ConnectionManager> {
        debug!("Loading connections from {}", self.cli.config.display());
        ConnectionManager::from_file(Self::factory(), &self.cli.config)
    }

    /// Describe the client of the selected connection
    fn inspect(&self) -> Result<()> {
        let mut manager = self.load_manager()?;
        let name = self
            .cli
            .connection
            .clone()
            .unwrap_or_else(|| manager.default_connection().to_string());
        let client = manager.connection(Some(&name))?;

        self.output_message(&describe(&name, client));
        Ok(())
    }

    /// GET a path through the selected connection
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<()> {
        let mut manager = self.load_manager()?;
        let client = manager.connection(self.cli.connection.as_deref())?;

        let config = query
            .iter()
            .fold(RequestConfig::new(), |config, (k, v)| config.query(k, v));

        let response = client
            .http_client()
            .get_with_config(path, config)
            .await?
            .error_for_status()?;

        let body = response
            .json::<Value>()
            .unwrap_or_else(|_| Value::String(response.text()));
        self.output_message(&body);
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Summary of a client, without secrets
fn describe(name: &str, client: &Client) -> Value {
    let credentials = client.credentials();
    json!({
        "connection": name,
        "base_url": client.base_url().as_str(),
        "auth": credentials.map(|c| c.kind.as_str()),
        "sudo": credentials.and_then(|c| c.sudo.as_deref()),
        "layers": client.http_client().layers(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthKind;
    use crate::http::{BackoffPolicy, Layer, Pipeline};

    #[test]
    fn test_describe_hides_token() {
        let mut client = Client::with_url("https://gitlab.example.com").unwrap();
        client.authenticate("secret", AuthKind::JobToken, Some("root".into()));
        client.decorate(Pipeline::new().with(Layer::Backoff(BackoffPolicy::default())));

        let summary = describe("main", &client);

        assert_eq!(summary["connection"], "main");
        assert_eq!(summary["base_url"], "https://gitlab.example.com/");
        assert_eq!(summary["auth"], "http_job_token");
        assert_eq!(summary["sudo"], "root");
        assert_eq!(summary["layers"], json!(["backoff"]));
        assert!(!summary.to_string().contains("secret"));
    }

    #[test]
    fn test_describe_anonymous() {
        let client = Client::new().unwrap();
        let summary = describe("public", &client);

        assert!(summary["auth"].is_null());
        assert!(summary["sudo"].is_null());
        assert_eq!(summary["layers"], json!([]));
    }
}

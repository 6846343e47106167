//! Connection manager
//!
//! Keeps one client per named connection, built lazily through a
//! [`ClientFactory`] from a [`ConnectionsConfig`].

use crate::client::Client;
use crate::config::{ConnectionConfig, ConnectionsConfig};
use crate::error::{Error, Result};
use crate::factory::ClientFactory;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Named connections and their live clients
#[derive(Debug)]
pub struct ConnectionManager {
    factory: ClientFactory,
    config: ConnectionsConfig,
    clients: HashMap<String, Client>,
}

impl ConnectionManager {
    /// Create a manager
    pub fn new(factory: ClientFactory, config: ConnectionsConfig) -> Self {
        Self {
            factory,
            config,
            clients: HashMap::new(),
        }
    }

    /// Create a manager from a connections file
    pub fn from_file(factory: ClientFactory, path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(factory, ConnectionsConfig::from_file(path)?))
    }

    /// Get a connection's client, building it on first use
    ///
    /// `None` selects the default connection.
    pub fn connection(&mut self, name: Option<&str>) -> Result<&Client> {
        let name = name.unwrap_or(&self.config.default).to_string();

        if !self.clients.contains_key(&name) {
            let client = self.make_connection(&name)?;
            self.clients.insert(name.clone(), client);
        }

        Ok(&self.clients[&name])
    }

    /// Drop and rebuild a connection's client
    pub fn reconnect(&mut self, name: Option<&str>) -> Result<&Client> {
        self.disconnect(name);
        self.connection(name)
    }

    /// Drop a connection's client, returning whether one was live
    pub fn disconnect(&mut self, name: Option<&str>) -> bool {
        let name = name.unwrap_or(&self.config.default).to_string();
        self.clients.remove(&name).is_some()
    }

    /// Names of connections with a live client, sorted
    pub fn connections(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clients.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Name of the default connection
    pub fn default_connection(&self) -> &str {
        &self.config.default
    }

    /// Change the default connection
    pub fn set_default_connection(&mut self, name: impl Into<String>) {
        self.config.default = name.into();
    }

    /// The config of a connection
    pub fn connection_config(&self, name: &str) -> Result<&ConnectionConfig> {
        self.config
            .get(name)
            .ok_or_else(|| Error::invalid_argument(format!("Connection [{name}] not configured.")))
    }

    /// The factory clients are built with
    pub fn factory(&self) -> &ClientFactory {
        &self.factory
    }

    fn make_connection(&self, name: &str) -> Result<Client> {
        let config = self.connection_config(name)?;
        info!(connection = name, "Connecting to gitlab");
        self.factory.make(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthKind;
    use std::io::Write;

    const CONNECTIONS: &str = r"
default: main
connections:
  main:
    method: token
    token: main-token
    backoff: false
  alternative:
    method: http_token
    token: alt-token
    url: https://gitlab.example.com
  broken:
    method: bar
";

    fn manager() -> ConnectionManager {
        ConnectionManager::new(
            ClientFactory::default(),
            ConnectionsConfig::from_yaml_str(CONNECTIONS).unwrap(),
        )
    }

    #[test]
    fn test_default_connection() {
        let mut manager = manager();
        assert_eq!(manager.default_connection(), "main");

        let client = manager.connection(None).unwrap();
        assert_eq!(client.credentials().unwrap().token, "main-token");
        assert_eq!(manager.connections(), vec!["main"]);
    }

    #[test]
    fn test_named_connection() {
        let mut manager = manager();

        let client = manager.connection(Some("alternative")).unwrap();
        assert_eq!(client.credentials().unwrap().kind, AuthKind::HttpToken);
        assert_eq!(client.base_url().as_str(), "https://gitlab.example.com/");
    }

    #[test]
    fn test_connection_is_reused() {
        let mut manager = manager();

        let first = manager.connection(None).unwrap().http_client().transport().clone();
        let again = manager.connection(Some("main")).unwrap().http_client().transport().clone();
        assert!(std::sync::Arc::ptr_eq(&first, &again));

        let rebuilt = manager.reconnect(None).unwrap().http_client().transport().clone();
        assert!(!std::sync::Arc::ptr_eq(&first, &rebuilt));
    }

    #[test]
    fn test_unknown_connection() {
        let mut manager = manager();
        let err = manager.connection(Some("missing")).unwrap_err();
        assert_eq!(err.to_string(), "Connection [missing] not configured.");
    }

    #[test]
    fn test_factory_errors_propagate() {
        let mut manager = manager();
        let err = manager.connection(Some("broken")).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported authentication method [bar].");
        assert!(manager.connections().is_empty());
    }

    #[test]
    fn test_disconnect() {
        let mut manager = manager();
        manager.connection(None).unwrap();

        assert!(manager.disconnect(Some("main")));
        assert!(!manager.disconnect(Some("main")));
        assert!(manager.connections().is_empty());
    }

    #[test]
    fn test_set_default_connection() {
        let mut manager = manager();
        manager.set_default_connection("alternative");

        let client = manager.connection(None).unwrap();
        assert_eq!(client.credentials().unwrap().token, "alt-token");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CONNECTIONS.as_bytes()).unwrap();

        let mut manager = ConnectionManager::from_file(ClientFactory::default(), file.path()).unwrap();
        assert!(manager.connection(Some("alternative")).is_ok());
    }
}

//! In-memory cache stores

use super::repository::{CacheEntry, CacheFactory, CacheRepository};
use crate::error::{Error, Result};
use crate::http::HttpResponse;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Name of the store `CacheManager::new` starts with
pub const DEFAULT_STORE: &str = "memory";

/// Process-local cache store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry
    pub async fn flush(&self) {
        self.entries.write().await.clear();
    }
}

#[async_trait]
impl CacheRepository for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<HttpResponse>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !entry.is_expired() => return Ok(Some(entry.response.clone())),
                Some(_) => {}
            }
        }

        // Expired: evict under the write lock
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(CacheEntry::is_expired) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn put(&self, key: &str, response: HttpResponse, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry::new(response, ttl));
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<bool> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some())
    }
}

/// Named cache stores with a default
#[derive(Debug, Clone)]
pub struct CacheManager {
    default: String,
    stores: HashMap<String, Arc<dyn CacheRepository>>,
}

impl CacheManager {
    /// Create a manager with a single in-memory default store
    pub fn new() -> Self {
        Self::empty(DEFAULT_STORE).with_store(DEFAULT_STORE, Arc::new(MemoryStore::new()))
    }

    /// Create a manager with no stores
    pub fn empty(default: impl Into<String>) -> Self {
        Self {
            default: default.into(),
            stores: HashMap::new(),
        }
    }

    /// Add a store
    #[must_use]
    pub fn with_store(mut self, name: impl Into<String>, store: Arc<dyn CacheRepository>) -> Self {
        self.stores.insert(name.into(), store);
        self
    }

    /// Name of the default store
    pub fn default_store(&self) -> &str {
        &self.default
    }

    /// Change the default store
    pub fn set_default_store(&mut self, name: impl Into<String>) {
        self.default = name.into();
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheFactory for CacheManager {
    fn store(&self, name: Option<&str>) -> Result<Arc<dyn CacheRepository>> {
        let name = name.unwrap_or(&self.default);
        self.stores
            .get(name)
            .cloned()
            .ok_or_else(|| Error::cache(format!("Cache store [{name}] is not defined.")))
    }
}

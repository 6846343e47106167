//! Response caching
//!
//! - `CacheFactory` / `CacheRepository`: the store contracts the client
//!   factory depends on
//! - `MemoryStore` / `CacheManager`: in-process implementations
//! - `CacheLayer`: the transport decorator that uses a store

mod layer;
mod memory;
mod repository;

pub use layer::{cache_key, CacheLayer};
pub use memory::{CacheManager, MemoryStore, DEFAULT_STORE};
pub use repository::{CacheEntry, CacheFactory, CacheRepository};

// =================================================================
// cache/mod.rs - Advisory key/value cache with TTL
// =================================================================

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub mod memory;
pub mod redis_cache;

#[cfg(test)]
pub(crate) mod fake_redis;

pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache call timed out after {0:?}")]
    Timeout(Duration),
}

/// Storage behind a [`CacheStore`]. Values travel as JSON text.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Overwrites `key`, expiring it `ttl` from now.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    fn name(&self) -> &'static str;
}

/// Typed front of the cache.
///
/// Callers treat it as advisory: without a backend, or when the backend
/// fails, every read is a miss and every write is dropped.
#[derive(Clone, Default)]
pub struct CacheStore {
    backend: Option<Arc<dyn CacheBackend>>,
}

impl CacheStore {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("none", |b| b.name())
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let backend = self.backend.as_ref()?;

        let raw = match backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read for '{}' failed, treating as miss: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Cached value for '{}' is not valid JSON, ignoring: {}", key, e);
                None
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let Some(backend) = self.backend.as_ref() else {
            return;
        };

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize value for '{}': {}", key, e);
                return;
            }
        };

        match backend.set(key, raw, ttl).await {
            Ok(()) => debug!("Cached '{}' for {:?}", key, ttl),
            Err(e) => warn!("Cache write for '{}' failed: {}", key, e),
        }
    }
}

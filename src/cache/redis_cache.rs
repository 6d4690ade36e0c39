// =================================================================
// cache/redis_cache.rs - Redis cache backend
// =================================================================

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use std::future::Future;
use std::time::Duration;
use tracing::info;

use super::{CacheBackend, CacheError};

/// Default bound on connecting and on each command.
pub const DEFAULT_REDIS_TIMEOUT: Duration = Duration::from_secs(1);

/// Redis-backed cache. Expiry is enforced by Redis itself (`PSETEX`).
///
/// Every round trip is bounded by `timeout`, so a stalled server costs a
/// request at most that long before it is treated as a miss.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    url: String,
    timeout: Duration,
}

impl RedisCache {
    /// Connect and `PING`, giving up after `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let connection = bounded(timeout, async move {
            let mut connection = ConnectionManager::new(client).await?;
            let pong: String = redis::cmd("PING").query_async(&mut connection).await?;
            info!("Redis at {} answered {}", url, pong);
            Ok::<_, redis::RedisError>(connection)
        })
        .await?;

        Ok(Self {
            connection,
            url: url.to_string(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, CacheError>
where
    F: Future<Output = RedisResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(CacheError::Timeout(limit)),
    }
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.connection.clone();
        bounded(self.timeout, conn.get(key)).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        // PSETEX rejects 0
        let millis = ttl.as_millis().max(1) as usize;
        bounded(self.timeout, conn.pset_ex::<_, _, ()>(key, value, millis)).await
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

pub fn redis_url(host: &str, port: u16) -> String {
    format!("redis://{}:{}", host, port)
}

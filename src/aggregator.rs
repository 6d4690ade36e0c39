// =================================================================
// aggregator.rs - Merged ticker data from both exchanges
// =================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::cache::CacheStore;
use crate::exchange::{ExchangeError, TickerSource};

/// Single global cache key for the merged payload.
pub const CACHE_KEY: &str = "crypto_data";

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedTickerData {
    pub binance: Value,
    pub coinbase: Value,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("{exchange} request failed: {source}")]
    Upstream {
        exchange: &'static str,
        #[source]
        source: ExchangeError,
    },
}

pub struct Aggregator {
    binance: Arc<dyn TickerSource>,
    coinbase: Arc<dyn TickerSource>,
    cache: CacheStore,
    cache_ttl: Duration,
}

impl Aggregator {
    pub fn new(
        binance: Arc<dyn TickerSource>,
        coinbase: Arc<dyn TickerSource>,
        cache: CacheStore,
    ) -> Self {
        Self {
            binance,
            coinbase,
            cache,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Cached payload if still fresh, otherwise both exchanges are queried.
    ///
    /// Either exchange failing fails the whole call; there is no partial payload.
    pub async fn fetch(&self) -> Result<AggregatedTickerData, FetchError> {
        if let Some(cached) = self.cache.get::<AggregatedTickerData>(CACHE_KEY).await {
            debug!("Cache hit for '{}'", CACHE_KEY);
            return Ok(cached);
        }
        debug!("Cache miss for '{}', querying exchanges", CACHE_KEY);

        let (binance, coinbase) =
            tokio::try_join!(fetch_from(&*self.binance), fetch_from(&*self.coinbase))?;

        let data = AggregatedTickerData { binance, coinbase };
        self.cache.set(CACHE_KEY, &data, self.cache_ttl).await;

        info!("Fetched fresh ticker data from binance and coinbase");
        Ok(data)
    }
}

async fn fetch_from(source: &dyn TickerSource) -> Result<Value, FetchError> {
    source.fetch_tickers().await.map_err(|e| {
        error!("Error fetching crypto data from {}: {}", source.name(), e);
        FetchError::Upstream {
            exchange: source.name(),
            source: e,
        }
    })
}

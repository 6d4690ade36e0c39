// =================================================================
// app.rs - Wiring settings into shared application state
// =================================================================

use anyhow::Context;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::aggregator::Aggregator;
use crate::api::AppState;
use crate::auth::{AlwaysAcceptPolicy, CredentialPolicy, TokenIssuer};
use crate::cache::{CacheStore, MemoryCache, RedisCache};
use crate::config::{self, CacheBackendKind, Settings};
use crate::exchange::{BinanceExchange, CoinbaseExchange};

/// Build the cache the settings ask for.
///
/// An unreachable or unresponsive Redis is not fatal: after
/// `redis_timeout` the gateway gives up and runs without a cache.
pub async fn create_cache(settings: &config::Cache) -> CacheStore {
    match settings.backend {
        CacheBackendKind::None => {
            info!("💾 Cache disabled by configuration");
            CacheStore::disabled()
        }
        CacheBackendKind::Memory => {
            info!("💾 Using in-process memory cache");
            CacheStore::new(Arc::new(MemoryCache::new()))
        }
        CacheBackendKind::Redis => {
            let url = settings.redis_url();
            match RedisCache::connect(&url, settings.redis_timeout()).await {
                Ok(cache) => {
                    info!("✅ Using Redis cache at {}", cache.url());
                    CacheStore::new(Arc::new(cache))
                }
                Err(e) => {
                    error!("Redis connection error: {}", e);
                    warn!("⚠️  Redis unavailable, continuing without cache");
                    CacheStore::disabled()
                }
            }
        }
    }
}

pub async fn build_state(settings: &Settings) -> anyhow::Result<AppState> {
    let secret = settings.jwt_secret()?;
    let tokens = Arc::new(TokenIssuer::with_ttl(&secret, settings.token_ttl()?));

    let policy: Arc<dyn CredentialPolicy> = Arc::new(AlwaysAcceptPolicy);
    warn!(
        "⚠️  Credential policy '{}' accepts any non-empty username/password",
        policy.name()
    );

    let timeout = settings.upstream.timeout();
    let binance = BinanceExchange::with_base_url(&settings.upstream.binance_url, timeout)
        .context("Failed to create Binance client")?;
    let coinbase = CoinbaseExchange::with_base_url(&settings.upstream.coinbase_url, timeout)
        .context("Failed to create Coinbase client")?;

    let cache = create_cache(&settings.cache).await;
    let aggregator = Aggregator::new(Arc::new(binance), Arc::new(coinbase), cache)
        .with_cache_ttl(settings.cache.ttl());

    Ok(AppState::new(tokens, policy, Arc::new(aggregator)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fake_redis::FakeRedis;
    use std::time::{Duration, Instant};

    fn cache_settings(backend: CacheBackendKind) -> config::Cache {
        config::Cache {
            backend,
            ..config::Cache::default()
        }
    }

    #[tokio::test]
    async fn test_create_cache_by_backend() {
        assert!(!create_cache(&cache_settings(CacheBackendKind::None))
            .await
            .is_enabled());

        let memory = create_cache(&cache_settings(CacheBackendKind::Memory)).await;
        assert_eq!(memory.backend_name(), "memory");
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_no_cache() {
        let settings = config::Cache {
            backend: CacheBackendKind::Redis,
            redis_url: Some("redis://127.0.0.1:1".to_string()),
            ..config::Cache::default()
        };

        let cache = create_cache(&settings).await;
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn test_stalled_redis_at_startup_falls_back_within_timeout() {
        let server = FakeRedis::builder().silent("PING").spawn().await;
        let settings = config::Cache {
            backend: CacheBackendKind::Redis,
            redis_url: Some(server.url()),
            redis_timeout_ms: 200,
            ..config::Cache::default()
        };

        let started = Instant::now();
        let cache = create_cache(&settings).await;

        assert!(!cache.is_enabled());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_answering_redis_is_used() {
        let server = FakeRedis::spawn().await;
        let settings = config::Cache {
            backend: CacheBackendKind::Redis,
            redis_url: Some(server.url()),
            ..config::Cache::default()
        };

        let cache = create_cache(&settings).await;
        assert_eq!(cache.backend_name(), "redis");
    }

    #[tokio::test]
    async fn test_build_state_rejects_out_of_range_token_ttl() {
        for ttl in ["0", "-1", "99999999999"] {
            let settings = Settings::from_env_with("unit-test", |key| match key {
                "TOKEN_TTL_SECS" => Some(ttl.to_string()),
                "CACHE_BACKEND" => Some("none".to_string()),
                _ => None,
            })
            .unwrap();

            assert!(build_state(&settings).await.is_err(), "ttl {}", ttl);
        }
    }

    #[tokio::test]
    async fn test_build_state_refuses_production_without_secret() {
        let settings = Settings::from_env_with("production", |_| None).unwrap();
        assert!(build_state(&settings).await.is_err());
    }

    #[tokio::test]
    async fn test_build_state_uses_configured_secret() {
        let settings = Settings::from_env_with("unit-test", |key| match key {
            "JWT_SECRET_KEY" => Some("configured".to_string()),
            "CACHE_BACKEND" => Some("none".to_string()),
            _ => None,
        })
        .unwrap();

        let state = build_state(&settings).await.unwrap();
        let token = state.tokens.issue("alice").unwrap();

        assert_eq!(TokenIssuer::new("configured").verify(&token).unwrap(), "alice");
        assert!(!state.aggregator.cache().is_enabled());
    }
}

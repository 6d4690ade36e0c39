use anyhow::bail;
use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::cache::redis_cache::redis_url;
use crate::exchange::{binance::BINANCE_API_URL, coinbase::COINBASE_API_URL};

/// Signing secret used when none is configured outside production.
pub const DEMO_JWT_SECRET: &str = "your-secret-key";

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 3600;

const PRODUCTION: &str = "production";

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Auth {
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

fn default_token_ttl() -> i64 {
    crate::auth::DEFAULT_TOKEN_TTL_SECS
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_secs: default_token_ttl(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    Redis,
    Memory,
    None,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Cache {
    #[serde(default)]
    pub backend: CacheBackendKind,
    /// Full URL; wins over host/port when set.
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_redis_host")]
    pub redis_host: String,
    #[serde(default = "default_redis_port")]
    pub redis_port: u16,
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Upper bound on connecting to Redis and on each Redis call.
    #[serde(default = "default_redis_timeout_ms")]
    pub redis_timeout_ms: u64,
}

fn default_redis_host() -> String {
    "localhost".to_string()
}

fn default_redis_port() -> u16 {
    6379
}

fn default_cache_ttl() -> u64 {
    crate::aggregator::DEFAULT_CACHE_TTL.as_secs()
}

fn default_redis_timeout_ms() -> u64 {
    crate::cache::redis_cache::DEFAULT_REDIS_TIMEOUT.as_millis() as u64
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::default(),
            redis_url: None,
            redis_host: default_redis_host(),
            redis_port: default_redis_port(),
            ttl_seconds: default_cache_ttl(),
            redis_timeout_ms: default_redis_timeout_ms(),
        }
    }
}

impl Cache {
    pub fn redis_url(&self) -> String {
        self.redis_url
            .clone()
            .unwrap_or_else(|| redis_url(&self.redis_host, self.redis_port))
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Upstream {
    #[serde(default = "default_binance_url")]
    pub binance_url: String,
    #[serde(default = "default_coinbase_url")]
    pub coinbase_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_binance_url() -> String {
    BINANCE_API_URL.to_string()
}

fn default_coinbase_url() -> String {
    COINBASE_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    crate::exchange::utils::DEFAULT_TIMEOUT.as_secs()
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            binance_url: default_binance_url(),
            coinbase_url: default_coinbase_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Upstream {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub run_mode: String,
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub cache: Cache,
    #[serde(default)]
    pub upstream: Upstream,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        Self::from_env_with(&run_mode, |key| std::env::var(key).ok())
    }

    /// Layer `config/{run_mode}.toml` (if any) under the given environment lookup.
    pub fn from_env_with<F>(run_mode: &str, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_file = format!("{}.toml", run_mode);
        let possible_paths = [
            format!("config/{}", config_file),
            format!("../config/{}", config_file),
        ];
        let config_path = possible_paths
            .iter()
            .find(|path| std::path::Path::new(path).exists());

        let mut builder = Config::builder().set_override("run_mode", run_mode)?;
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let overrides = [
            ("HOST", "server.host"),
            ("PORT", "server.port"),
            ("JWT_SECRET_KEY", "auth.jwt_secret"),
            ("CACHE_BACKEND", "cache.backend"),
            ("REDIS_URL", "cache.redis_url"),
            ("REDIS_HOST", "cache.redis_host"),
            ("REDIS_PORT", "cache.redis_port"),
            ("REDIS_TIMEOUT_MS", "cache.redis_timeout_ms"),
            ("TOKEN_TTL_SECS", "auth.token_ttl_secs"),
            ("BINANCE_API_URL", "upstream.binance_url"),
            ("COINBASE_API_URL", "upstream.coinbase_url"),
            ("UPSTREAM_TIMEOUT_SECS", "upstream.timeout_secs"),
        ];
        for (var, key) in overrides {
            if let Some(value) = env(var) {
                builder = builder.set_override(key, value)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    pub fn is_production(&self) -> bool {
        self.run_mode.eq_ignore_ascii_case(PRODUCTION)
    }

    /// The token signing secret.
    ///
    /// The demo secret is only handed out outside production; running
    /// production without `JWT_SECRET_KEY` is a deployment error.
    pub fn jwt_secret(&self) -> anyhow::Result<String> {
        match self.auth.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(secret.to_string()),
            _ if self.is_production() => {
                bail!("JWT_SECRET_KEY must be set when RUN_MODE={}", PRODUCTION)
            }
            _ => {
                warn!(
                    "⚠️  JWT_SECRET_KEY not set, signing tokens with the demo secret. Never do this in production!"
                );
                Ok(DEMO_JWT_SECRET.to_string())
            }
        }
    }

    /// Access token lifetime, which must lie in `1..=MAX_TOKEN_TTL_SECS` seconds.
    pub fn token_ttl(&self) -> anyhow::Result<chrono::Duration> {
        let secs = self.auth.token_ttl_secs;
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
            bail!(
                "auth.token_ttl_secs must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_SECS,
                secs
            );
        }
        Ok(chrono::Duration::seconds(secs))
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

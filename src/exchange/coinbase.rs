// =================================================================
// exchange/coinbase.rs - Coinbase product list
// =================================================================

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{
    errors::ExchangeError,
    traits::TickerSource,
    utils::{build_http_client, fetch_json, join_url, DEFAULT_TIMEOUT},
};

pub const COINBASE_API_URL: &str = "https://api.pro.coinbase.com";
const PRODUCTS_PATH: &str = "/products";

pub struct CoinbaseExchange {
    api_url: String,
    client: reqwest::Client,
}

impl CoinbaseExchange {
    pub fn new() -> Result<Self, ExchangeError> {
        Self::with_base_url(COINBASE_API_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ExchangeError> {
        Ok(Self {
            api_url: join_url(base_url, PRODUCTS_PATH),
            client: build_http_client(timeout)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl TickerSource for CoinbaseExchange {
    fn name(&self) -> &'static str {
        "coinbase"
    }

    async fn fetch_tickers(&self) -> Result<Value, ExchangeError> {
        fetch_json(&self.client, &self.api_url).await
    }
}

// =================================================================
// exchange/binance.rs - Binance public ticker
// =================================================================

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use super::{
    errors::ExchangeError,
    traits::TickerSource,
    utils::{build_http_client, fetch_json, join_url, DEFAULT_TIMEOUT},
};

pub const BINANCE_API_URL: &str = "https://api.binance.com";
const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";

/// Latest price for every Binance symbol.
pub struct BinanceExchange {
    api_url: String,
    client: reqwest::Client,
}

impl BinanceExchange {
    pub fn new() -> Result<Self, ExchangeError> {
        Self::with_base_url(BINANCE_API_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ExchangeError> {
        Ok(Self {
            api_url: join_url(base_url, TICKER_PRICE_PATH),
            client: build_http_client(timeout)?,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl TickerSource for BinanceExchange {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn fetch_tickers(&self) -> Result<Value, ExchangeError> {
        fetch_json(&self.client, &self.api_url).await
    }
}

// =================================================================
// exchange/traits.rs - Exchange Interface
// =================================================================

use async_trait::async_trait;
use serde_json::Value;

use super::ExchangeError;

/// A public ticker endpoint of one upstream exchange.
///
/// Payloads are passed through untouched; no schema is imposed on them.
#[async_trait]
pub trait TickerSource: Send + Sync {
    /// Short lowercase name, also the key of this exchange in the merged payload.
    fn name(&self) -> &'static str;

    async fn fetch_tickers(&self) -> Result<Value, ExchangeError>;
}

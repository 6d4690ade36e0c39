// =================================================================
// exchange/utils.rs - Shared HTTP helpers
// =================================================================

use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::ExchangeError;

/// Default bound on a single outbound call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

// Coinbase refuses requests without a User-Agent.
const USER_AGENT: &str = concat!("crypto_gateway/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body kept in an `ApiError`.
const MAX_ERROR_BODY: usize = 512;

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ExchangeError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ExchangeError::NetworkError(format!("Failed to build HTTP client: {}", e)))
}

/// GET `url` and parse the body as JSON. Non-2xx responses are errors.
pub async fn fetch_json(client: &reqwest::Client, url: &str) -> Result<Value, ExchangeError> {
    debug!("Fetching {}", url);

    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let mut body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
        return Err(ExchangeError::ApiError { status, body });
    }

    let text = response.text().await?;
    let value = serde_json::from_str(&text)?;
    Ok(value)
}

/// Join a base URL and a path without doubling or dropping the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

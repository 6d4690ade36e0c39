//! Logging setup.
//!
//! Levels come from `RUST_LOG`, for example:
//! ```bash
//! # Cache hits/misses and token rejections
//! RUST_LOG=crypto_gateway=debug cargo run
//!
//! # Errors only
//! RUST_LOG=error cargo run
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "crypto_gateway=info,gateway_server=info,tower_http=info";

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let installed = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("🔧 Logging initialized");
    }
}

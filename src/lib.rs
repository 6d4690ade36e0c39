pub mod aggregator;
pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod exchange;
pub mod utils;

pub use aggregator::{AggregatedTickerData, Aggregator, FetchError};
pub use api::{create_router, AppState};
pub use auth::{AuthError, TokenIssuer};
pub use cache::CacheStore;

// exchange/mod.rs
pub mod binance;
pub mod coinbase;
pub mod errors;
pub mod traits;
pub mod utils;

pub use binance::BinanceExchange;
pub use coinbase::CoinbaseExchange;
pub use errors::ExchangeError;
pub use traits::TickerSource;

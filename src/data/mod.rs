//! Market log loading and storage

pub mod forecast;
pub mod log_loader;
pub mod store;

// Re-export commonly used types
pub use forecast::{forecast_prices, fractional_to_decimal};
pub use log_loader::{load_market_log, parse_market_log, LoadOptions, LoadStats};
pub use store::{MarketLog, SnapshotStore};

//! Order reconstruction, limits and settlement

pub mod extractor;
pub mod limits;
pub mod settlement;

// Re-export commonly used types
pub use extractor::{extract_orders, ExtractedEvent, ExtractedOrders, PriorState};
pub use limits::{order_limits, LimitMap, OrderLimits};
pub use settlement::{settle, settle_final, Settlement};

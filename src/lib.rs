//! Betlog - retrospective evaluation of exchange betting logs
//!
//! This library provides:
//! - Loading of line-delimited JSON market logs into per-market snapshots
//! - Reconstruction of order placements by diffing successive snapshots
//! - Pricing hypothesis checks against forecast and last traded prices
//! - Settlement of the final order book against the winning runner
//!
//! # Example
//!
//! ```no_run
//! use betlog::backtesting::{EvaluationConfig, MarketEvaluator};
//! use betlog::data::{load_market_log, LoadOptions};
//!
//! let (store, _stats) = load_market_log("assessment_log.json", &LoadOptions::default()).unwrap();
//! let evaluator = MarketEvaluator::new(EvaluationConfig::default());
//! let report = evaluator.run(&store).unwrap();
//! println!("Profit: {:.2}", report.settlement.profit);
//! ```

pub mod backtesting;
pub mod core;
pub mod data;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use backtesting::{EvaluationConfig, EvaluationReport, MarketEvaluator};
pub use data::{load_market_log, LoadOptions, MarketLog, SnapshotStore};
pub use error::{EvalError, LoadError};
pub use models::{Order, RunnerState, SelectionId, Side, Snapshot};

//! Retrospective evaluation of the orders placed in a market

pub mod evaluator;
pub mod metrics;
pub mod pipeline;

pub use metrics::{analyze_by_runner, HypothesisTally, RunnerBreakdown};
pub use pipeline::{EvaluationConfig, EvaluationReport, MarketEvaluator};

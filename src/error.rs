use std::path::PathBuf;
use thiserror::Error;

use crate::models::SelectionId;

/// Errors raised while reading a market log
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read log {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },
}

/// Errors raised while evaluating a loaded market
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Market {0} not found in log")]
    UnknownMarket(String),

    #[error("Market {market_id}: runner {selection_id} listed twice in snapshot {index}")]
    DuplicateRunner {
        market_id: String,
        index: usize,
        selection_id: SelectionId,
    },
}

//! In-memory snapshot store grouped by market

use std::collections::HashMap;

use crate::models::{SelectionId, Snapshot};

/// Everything recorded for one market
#[derive(Debug, Clone, Default)]
pub struct MarketLog {
    pub market_id: String,
    /// Forecast decimal odds, empty if no description record was seen
    pub forecast: HashMap<SelectionId, f64>,
    /// OPEN snapshots in arrival order; the index is the sequence number
    pub snapshots: Vec<Snapshot>,
}

impl MarketLog {
    pub fn new(market_id: impl Into<String>) -> Self {
        Self {
            market_id: market_id.into(),
            ..Default::default()
        }
    }

    pub fn has_description(&self) -> bool {
        !self.forecast.is_empty()
    }

    pub fn final_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}

/// Market logs indexed by market id
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    markets: HashMap<String, MarketLog>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the log for a market
    pub fn market_mut(&mut self, market_id: &str) -> &mut MarketLog {
        self.markets
            .entry(market_id.to_string())
            .or_insert_with(|| MarketLog::new(market_id))
    }

    pub fn market(&self, market_id: &str) -> Option<&MarketLog> {
        self.markets.get(market_id)
    }

    pub fn insert(&mut self, market: MarketLog) {
        self.markets.insert(market.market_id.clone(), market);
    }

    /// Market ids sorted for stable listing
    pub fn market_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.markets.keys().map(String::as_str).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn total_snapshots(&self) -> usize {
        self.markets.values().map(|m| m.snapshots.len()).sum()
    }
}

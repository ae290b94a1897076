//! Hypothesis tallies and per-runner order statistics

use serde::{Deserialize, Serialize};

use crate::core::extractor::ExtractedOrders;
use crate::models::{SelectionId, Side};

/// Pass/fail counts of a pricing hypothesis, split by side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypothesisTally {
    pub back_holds: usize,
    pub back_fails: usize,
    pub lay_holds: usize,
    pub lay_fails: usize,
    /// Orders the hypothesis could not be checked against
    pub not_applicable: usize,
}

impl HypothesisTally {
    pub fn record(&mut self, side: Side, holds: bool) {
        match (side, holds) {
            (Side::Back, true) => self.back_holds += 1,
            (Side::Back, false) => self.back_fails += 1,
            (Side::Lay, true) => self.lay_holds += 1,
            (Side::Lay, false) => self.lay_fails += 1,
        }
    }

    pub fn skip(&mut self) {
        self.not_applicable += 1;
    }

    pub fn holds(&self) -> usize {
        self.back_holds + self.lay_holds
    }

    /// Orders that were actually tested
    pub fn tested(&self) -> usize {
        self.back_holds + self.back_fails + self.lay_holds + self.lay_fails
    }

    /// Share of tested orders for which the hypothesis held
    pub fn hold_rate(&self) -> f64 {
        let tested = self.tested();
        if tested == 0 {
            0.0
        } else {
            self.holds() as f64 / tested as f64
        }
    }
}

/// Order statistics for one runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerBreakdown {
    pub selection_id: SelectionId,
    pub orders: usize,
    pub backs: usize,
    pub lays: usize,
    pub avg_price: f64,
    pub first_index: usize,
    pub last_index: usize,
}

/// Summarise extracted orders per runner, sorted by selection id
pub fn analyze_by_runner(orders: &ExtractedOrders) -> Vec<RunnerBreakdown> {
    orders
        .selection_ids()
        .filter_map(|selection_id| {
            let events = orders.runner(selection_id)?;
            let total = events.len();
            if total == 0 {
                return None;
            }

            let backs = events.values().filter(|e| e.side() == Side::Back).count();
            let price_sum: f64 = events.values().map(|e| e.price()).sum();
            let first_index = events.values().map(|e| e.sequence_index).min()?;
            let last_index = events.values().map(|e| e.sequence_index).max()?;

            Some(RunnerBreakdown {
                selection_id,
                orders: total,
                backs,
                lays: total - backs,
                avg_price: price_sum / total as f64,
                first_index,
                last_index,
            })
        })
        .collect()
}

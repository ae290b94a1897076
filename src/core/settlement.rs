//! Settlement of matched orders
//!
//! One runner wins, every other runner loses:
//!     BACK on winner:  +size * (avg_price - 1)
//!     BACK on loser:   -size
//!     LAY on winner:   -size * (avg_price - 1)
//!     LAY on loser:    +size
//!
//! Only matched size is settled. There is no void or partial settlement.

use serde::{Deserialize, Serialize};

use crate::models::{Order, SelectionId, Side, Snapshot};

/// Result of settling a market
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub profit: f64,
    pub staked: f64,
}

impl Settlement {
    /// Profit per unit staked
    pub fn roi(&self) -> f64 {
        if self.staked == 0.0 {
            0.0
        } else {
            self.profit / self.staked
        }
    }
}

/// Profit of a single order given whether its runner won
pub fn order_profit(order: &Order, runner_won: bool) -> f64 {
    let winnings = order.size_matched * (order.avg_price_matched - 1.0);
    match (order.side, runner_won) {
        (Side::Back, true) => winnings,
        (Side::Back, false) => -order.size_matched,
        (Side::Lay, true) => -winnings,
        (Side::Lay, false) => order.size_matched,
    }
}

/// Settle every order in a snapshot against the winning runner
///
/// # Examples
/// ```
/// use betlog::core::settlement::settle;
/// use betlog::models::{Order, RunnerState, Side, Snapshot};
///
/// let snapshot = Snapshot {
///     market_id: "1.1".to_string(),
///     runners: vec![RunnerState::new(7)
///         .with_orders(vec![Order::new("a", Side::Back, 3.0).matched(10.0, 3.0)])],
/// };
/// let result = settle(&snapshot, 7);
/// assert!((result.profit - 20.0).abs() < 1e-9);
/// assert!((result.staked - 10.0).abs() < 1e-9);
/// ```
pub fn settle(snapshot: &Snapshot, winner: SelectionId) -> Settlement {
    snapshot
        .runners
        .iter()
        .flat_map(|runner| {
            let won = runner.selection_id == winner;
            runner.orders.iter().map(move |order| (order, won))
        })
        .fold(Settlement::default(), |mut acc, (order, won)| {
            acc.staked += order.size_matched;
            acc.profit += order_profit(order, won);
            acc
        })
}

/// Settle the final snapshot, or nothing if there is none
pub fn settle_final(snapshots: &[Snapshot], winner: SelectionId) -> Settlement {
    snapshots
        .last()
        .map(|s| settle(s, winner))
        .unwrap_or_default()
}

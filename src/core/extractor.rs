//! Order placement reconstruction
//!
//! The log only contains full snapshots of each runner's order book, so the
//! moment an order was placed has to be inferred: an order is placed at the
//! first snapshot whose book contains a bet id that the runner's previous
//! book did not.
//!
//! The walk is a fold over `(PriorState, Snapshot) -> (PriorState, events)`.
//! Each step only looks at the state produced by the step before it.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info};

use crate::data::MarketLog;
use crate::error::EvalError;
use crate::models::{BetId, Order, RunnerState, SelectionId, Side, Snapshot};

/// An order at the moment it was first observed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedEvent {
    pub selection_id: SelectionId,
    pub order: Order,
    /// Runner state at the preceding snapshot, `None` when the runner had
    /// not been seen before
    pub prior: Option<RunnerState>,
    /// Index of the snapshot where the order first appeared
    pub sequence_index: usize,
}

impl ExtractedEvent {
    pub fn side(&self) -> Side {
        self.order.side
    }

    pub fn price(&self) -> f64 {
        self.order.price
    }

    /// Last traded price before the order was placed, if known
    pub fn baseline_last_price(&self) -> Option<f64> {
        self.prior.as_ref().and_then(|p| p.last_price_traded)
    }
}

/// Runner book as of the last processed snapshot
#[derive(Debug, Clone)]
struct PriorRecord {
    order_ids: HashSet<BetId>,
    state: RunnerState,
}

impl PriorRecord {
    fn from_state(state: &RunnerState) -> Self {
        Self {
            order_ids: state.orders.iter().map(|o| o.bet_id.clone()).collect(),
            state: state.clone(),
        }
    }
}

/// Rolling per-runner state threaded through the snapshot fold
#[derive(Debug, Clone, Default)]
pub struct PriorState {
    runners: HashMap<SelectionId, PriorRecord>,
}

impl PriorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner state recorded by the last step, if any
    pub fn runner(&self, selection_id: SelectionId) -> Option<&RunnerState> {
        self.runners.get(&selection_id).map(|r| &r.state)
    }

    /// Diff one snapshot against this state
    ///
    /// Returns the state to use for the next snapshot and the orders that
    /// appear in `snapshot` but not in this state. Runners missing from the
    /// snapshot keep their previous record.
    pub fn advance(
        mut self,
        market_id: &str,
        index: usize,
        snapshot: &Snapshot,
    ) -> Result<(PriorState, Vec<ExtractedEvent>), EvalError> {
        let mut seen: HashSet<SelectionId> = HashSet::with_capacity(snapshot.runners.len());
        let mut events = Vec::new();

        for runner in &snapshot.runners {
            if !seen.insert(runner.selection_id) {
                return Err(EvalError::DuplicateRunner {
                    market_id: market_id.to_string(),
                    index,
                    selection_id: runner.selection_id,
                });
            }

            let prior = self.runners.get(&runner.selection_id);
            let mut emitted: HashSet<&str> = HashSet::new();

            for order in &runner.orders {
                let known = prior.is_some_and(|p| p.order_ids.contains(&order.bet_id));
                if known || !emitted.insert(order.bet_id.as_str()) {
                    continue;
                }
                events.push(ExtractedEvent {
                    selection_id: runner.selection_id,
                    order: order.clone(),
                    prior: prior.map(|p| p.state.clone()),
                    sequence_index: index,
                });
            }
        }

        for runner in &snapshot.runners {
            self.runners
                .insert(runner.selection_id, PriorRecord::from_state(runner));
        }

        Ok((self, events))
    }
}

/// Reconstructed orders: selection id -> bet id -> event
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExtractedOrders {
    runners: BTreeMap<SelectionId, BTreeMap<BetId, ExtractedEvent>>,
}

impl ExtractedOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event unless its (runner, bet id) pair is already known
    ///
    /// Returns `false` if an earlier event was kept instead.
    pub fn record(&mut self, event: ExtractedEvent) -> bool {
        let runner = self.runners.entry(event.selection_id).or_default();
        if runner.contains_key(&event.order.bet_id) {
            return false;
        }
        runner.insert(event.order.bet_id.clone(), event);
        true
    }

    pub fn get(&self, selection_id: SelectionId, bet_id: &str) -> Option<&ExtractedEvent> {
        self.runners.get(&selection_id)?.get(bet_id)
    }

    pub fn runner(
        &self,
        selection_id: SelectionId,
    ) -> Option<&BTreeMap<BetId, ExtractedEvent>> {
        self.runners.get(&selection_id)
    }

    pub fn selection_ids(&self) -> impl Iterator<Item = SelectionId> + '_ {
        self.runners.keys().copied()
    }

    /// All events, ordered by selection id then bet id
    pub fn events(&self) -> impl Iterator<Item = &ExtractedEvent> {
        self.runners.values().flat_map(|orders| orders.values())
    }

    /// Total number of reconstructed orders
    pub fn count(&self) -> usize {
        self.runners.values().map(|orders| orders.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Reconstruct every order placed in a market
pub fn extract_orders(market: &MarketLog) -> Result<ExtractedOrders, EvalError> {
    extract_from_snapshots(&market.market_id, &market.snapshots)
}

/// Reconstruct orders from snapshots given in arrival order
pub fn extract_from_snapshots(
    market_id: &str,
    snapshots: &[Snapshot],
) -> Result<ExtractedOrders, EvalError> {
    let (_, orders) = snapshots.iter().enumerate().try_fold(
        (PriorState::new(), ExtractedOrders::new()),
        |(prior, mut orders), (index, snapshot)| {
            let (next, events) = prior.advance(market_id, index, snapshot)?;
            if !events.is_empty() {
                debug!("Snapshot {}: {} new orders", index, events.len());
            }
            for event in events {
                orders.record(event);
            }
            Ok::<_, EvalError>((next, orders))
        },
    )?;

    info!(
        "Extracted {} orders across {} runners in market {}",
        orders.count(),
        orders.runners.len(),
        market_id
    );

    Ok(orders)
}

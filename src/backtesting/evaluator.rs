//! Pricing hypotheses checked against reconstructed orders
//!
//! Every check treats missing reference data (no forecast, no prior last
//! traded price, no recorded limit, empty ladder) as not applicable. Missing
//! values never take part in a price comparison.

use std::collections::HashMap;

use super::metrics::HypothesisTally;
use crate::core::extractor::ExtractedOrders;
use crate::core::limits::LimitMap;
use crate::models::{SelectionId, Side, Snapshot};

/// Did the order get a price at least as good as the forecast?
///
/// BACK holds when `price >= forecast`, LAY holds when `price <= forecast`.
pub fn forecast_test(
    orders: &ExtractedOrders,
    forecast: &HashMap<SelectionId, f64>,
) -> HypothesisTally {
    let mut tally = HypothesisTally::default();
    for event in orders.events() {
        match forecast.get(&event.selection_id) {
            Some(&expected) => tally.record(event.side(), beats(event.side(), event.price(), expected)),
            None => tally.skip(),
        }
    }
    tally
}

/// Did the order get a price at least as good as the last traded price
/// seen before it was placed?
pub fn last_traded_test(orders: &ExtractedOrders) -> HypothesisTally {
    let mut tally = HypothesisTally::default();
    for event in orders.events() {
        match event.baseline_last_price() {
            Some(last) => tally.record(event.side(), beats(event.side(), event.price(), last)),
            None => tally.skip(),
        }
    }
    tally
}

/// Count snapshots where a threshold strategy would have been able to bet
///
/// For each snapshot and each runner with recorded limits, one opportunity
/// is counted when the back quote is at or above `min_back` and another when
/// the lay quote is at or below `max_lay`.
pub fn threshold_opportunities(snapshots: &[Snapshot], limits: &LimitMap) -> usize {
    snapshots
        .iter()
        .flat_map(|snapshot| snapshot.runners.iter())
        .filter_map(|runner| limits.get(&runner.selection_id).map(|l| (runner, l)))
        .map(|(runner, limit)| {
            let back = matches!(
                (runner.ex.back_quote(), limit.min_back),
                (Some(quote), Some(min_back)) if quote >= min_back
            );
            let lay = matches!(
                (runner.ex.lay_quote(), limit.max_lay),
                (Some(quote), Some(max_lay)) if quote <= max_lay
            );
            back as usize + lay as usize
        })
        .sum()
}

/// Price comparison from the bettor's point of view
fn beats(side: Side, price: f64, reference: f64) -> bool {
    match side {
        Side::Back => price >= reference,
        Side::Lay => price <= reference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor::ExtractedEvent;
    use crate::core::limits::OrderLimits;
    use crate::models::{Order, RunnerState};

    fn event(selection_id: SelectionId, bet_id: &str, side: Side, price: f64) -> ExtractedEvent {
        ExtractedEvent {
            selection_id,
            order: Order::new(bet_id, side, price),
            prior: None,
            sequence_index: 1,
        }
    }

    fn with_last_price(mut event: ExtractedEvent, last: Option<f64>) -> ExtractedEvent {
        let mut prior = RunnerState::new(event.selection_id);
        prior.last_price_traded = last;
        event.prior = Some(prior);
        event
    }

    fn collect(events: Vec<ExtractedEvent>) -> ExtractedOrders {
        let mut orders = ExtractedOrders::new();
        for e in events {
            orders.record(e);
        }
        orders
    }

    #[test]
    fn test_forecast_test() {
        let orders = collect(vec![
            event(1, "a", Side::Back, 4.0),
            event(1, "b", Side::Back, 3.0),
            event(1, "c", Side::Lay, 3.0),
            event(1, "d", Side::Lay, 4.0),
            event(1, "e", Side::Back, 3.5),
            event(2, "f", Side::Back, 9.0),
        ]);
        let forecast = HashMap::from([(1, 3.5)]);

        let tally = forecast_test(&orders, &forecast);
        assert_eq!(tally.back_holds, 2);
        assert_eq!(tally.back_fails, 1);
        assert_eq!(tally.lay_holds, 1);
        assert_eq!(tally.lay_fails, 1);
        assert_eq!(tally.not_applicable, 1);
    }

    #[test]
    fn test_last_traded_test() {
        let orders = collect(vec![
            with_last_price(event(1, "a", Side::Back, 4.0), Some(3.8)),
            with_last_price(event(1, "b", Side::Back, 4.0), Some(4.2)),
            with_last_price(event(1, "c", Side::Lay, 4.0), Some(4.0)),
            with_last_price(event(1, "d", Side::Lay, 4.0), Some(3.9)),
            with_last_price(event(1, "e", Side::Lay, 4.0), None),
            event(1, "f", Side::Back, 4.0),
        ]);

        let tally = last_traded_test(&orders);
        assert_eq!(tally.back_holds, 1);
        assert_eq!(tally.back_fails, 1);
        assert_eq!(tally.lay_holds, 1);
        assert_eq!(tally.lay_fails, 1);
        assert_eq!(tally.not_applicable, 2);
    }

    fn ladder_snapshot(selection_id: SelectionId, backs: &[f64], lays: &[f64]) -> Snapshot {
        Snapshot {
            market_id: "1.1".to_string(),
            runners: vec![RunnerState::new(selection_id).with_ladders(backs, lays)],
        }
    }

    #[test]
    fn test_threshold_back_quote() {
        let limits = LimitMap::from([(
            1,
            OrderLimits {
                min_back: Some(4.0),
                max_lay: None,
            },
        )]);

        assert_eq!(threshold_opportunities(&[ladder_snapshot(1, &[4.5], &[])], &limits), 1);
        assert_eq!(threshold_opportunities(&[ladder_snapshot(1, &[3.9], &[])], &limits), 0);
        assert_eq!(threshold_opportunities(&[ladder_snapshot(1, &[4.0], &[])], &limits), 1);
    }

    #[test]
    fn test_threshold_both_sides_same_snapshot() {
        let limits = LimitMap::from([(
            1,
            OrderLimits {
                min_back: Some(4.0),
                max_lay: Some(5.0),
            },
        )]);
        let snapshots = vec![
            ladder_snapshot(1, &[4.2, 4.1], &[4.4, 4.6]),
            ladder_snapshot(1, &[4.2, 3.8], &[5.2]),
        ];

        // first snapshot: back and lay, second: neither
        assert_eq!(threshold_opportunities(&snapshots, &limits), 2);
    }

    #[test]
    fn test_threshold_unset_limits_and_unknown_runners() {
        let limits = LimitMap::from([(1, OrderLimits::default())]);
        let snapshots = vec![
            ladder_snapshot(1, &[4.5], &[4.6]),
            ladder_snapshot(2, &[4.5], &[4.6]),
        ];
        assert_eq!(threshold_opportunities(&snapshots, &limits), 0);
    }

    #[test]
    fn test_threshold_empty_ladder() {
        let limits = LimitMap::from([(
            1,
            OrderLimits {
                min_back: Some(1.01),
                max_lay: Some(1000.0),
            },
        )]);
        assert_eq!(threshold_opportunities(&[ladder_snapshot(1, &[], &[])], &limits), 0);
    }
}

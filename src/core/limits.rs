//! Per-runner price limits reached by the strategy

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::extractor::ExtractedOrders;
use crate::models::{SelectionId, Side};

/// Most extreme prices accepted for a runner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderLimits {
    /// Lowest price accepted on a BACK order
    pub min_back: Option<f64>,
    /// Highest price accepted on a LAY order
    pub max_lay: Option<f64>,
}

impl OrderLimits {
    pub fn observe(&mut self, side: Side, price: f64) {
        match side {
            Side::Back => {
                self.min_back = Some(self.min_back.map_or(price, |m| m.min(price)));
            }
            Side::Lay => {
                self.max_lay = Some(self.max_lay.map_or(price, |m| m.max(price)));
            }
        }
    }
}

/// Limits keyed by runner; runners without orders are absent
pub type LimitMap = BTreeMap<SelectionId, OrderLimits>;

/// Reduce extracted orders to per-runner limits
pub fn order_limits(orders: &ExtractedOrders) -> LimitMap {
    let mut limits = LimitMap::new();
    for event in orders.events() {
        limits
            .entry(event.selection_id)
            .or_default()
            .observe(event.side(), event.price());
    }
    limits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::extractor::ExtractedEvent;
    use crate::models::Order;

    fn orders_from(entries: &[(SelectionId, &str, Side, f64)]) -> ExtractedOrders {
        let mut orders = ExtractedOrders::new();
        for &(selection_id, bet_id, side, price) in entries {
            orders.record(ExtractedEvent {
                selection_id,
                order: Order::new(bet_id, side, price),
                prior: None,
                sequence_index: 0,
            });
        }
        orders
    }

    #[test]
    fn test_min_back_only() {
        let orders = orders_from(&[
            (1, "a", Side::Back, 5.0),
            (1, "b", Side::Back, 3.2),
            (1, "c", Side::Back, 9.0),
        ]);
        let limits = order_limits(&orders);

        assert_eq!(limits[&1].min_back, Some(3.2));
        assert_eq!(limits[&1].max_lay, None);
    }

    #[test]
    fn test_both_sides() {
        let orders = orders_from(&[
            (1, "a", Side::Lay, 2.5),
            (1, "b", Side::Back, 3.0),
            (1, "c", Side::Lay, 2.9),
            (2, "d", Side::Lay, 7.0),
        ]);
        let limits = order_limits(&orders);

        assert_eq!(limits.len(), 2);
        assert_eq!(limits[&1].min_back, Some(3.0));
        assert_eq!(limits[&1].max_lay, Some(2.9));
        assert_eq!(limits[&2].min_back, None);
        assert_eq!(limits[&2].max_lay, Some(7.0));
    }

    #[test]
    fn test_no_orders_no_limits() {
        let limits = order_limits(&ExtractedOrders::new());
        assert!(limits.is_empty());
    }

    #[test]
    fn test_observe_first_value_initialises() {
        let mut limits = OrderLimits::default();
        limits.observe(Side::Back, 1000.0);
        assert_eq!(limits.min_back, Some(1000.0));
        limits.observe(Side::Lay, 1.01);
        assert_eq!(limits.max_lay, Some(1.01));
    }
}

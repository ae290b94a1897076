//! Market evaluation pipeline
//!
//! Runs the full evaluation for the market of interest: reconstruct orders,
//! derive limits, check pricing hypotheses and settle the final snapshot.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::evaluator::{forecast_test, last_traded_test, threshold_opportunities};
use super::metrics::HypothesisTally;
use crate::core::extractor::{extract_orders, ExtractedOrders};
use crate::core::limits::{order_limits, LimitMap};
use crate::core::settlement::{settle_final, Settlement};
use crate::data::{MarketLog, SnapshotStore};
use crate::error::EvalError;
use crate::models::SelectionId;

/// Market evaluated when none is given
pub const DEFAULT_MARKET_ID: &str = "1.170226122";

/// Winning runner of the default market
pub const DEFAULT_WINNER: SelectionId = 27157433;

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationConfig {
    /// Market of interest
    pub market_id: String,
    /// Runner that won the market, used for settlement
    pub winner: SelectionId,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            market_id: DEFAULT_MARKET_ID.to_string(),
            winner: DEFAULT_WINNER,
        }
    }
}

/// Everything computed for one market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub market_id: String,
    pub winner: SelectionId,
    pub snapshots: usize,
    pub bet_count: usize,
    pub limits: LimitMap,
    pub forecast: HypothesisTally,
    pub last_traded: HypothesisTally,
    pub threshold_opportunities: usize,
    pub settlement: Settlement,
}

/// Evaluates the configured market of a snapshot store
pub struct MarketEvaluator {
    pub config: EvaluationConfig,
}

impl MarketEvaluator {
    pub fn new(config: EvaluationConfig) -> Self {
        Self { config }
    }

    /// Look up the market of interest
    pub fn market<'a>(&self, store: &'a SnapshotStore) -> Result<&'a MarketLog, EvalError> {
        store
            .market(&self.config.market_id)
            .ok_or_else(|| EvalError::UnknownMarket(self.config.market_id.clone()))
    }

    /// Reconstruct the orders of the market of interest
    pub fn extract(&self, store: &SnapshotStore) -> Result<ExtractedOrders, EvalError> {
        extract_orders(self.market(store)?)
    }

    /// Run the full evaluation
    pub fn run(&self, store: &SnapshotStore) -> Result<EvaluationReport, EvalError> {
        self.evaluate(self.market(store)?)
    }

    /// Evaluate a single market log
    pub fn evaluate(&self, market: &MarketLog) -> Result<EvaluationReport, EvalError> {
        info!(
            "Evaluating market {} ({} snapshots)",
            market.market_id,
            market.snapshots.len()
        );

        let orders = extract_orders(market)?;
        let limits = order_limits(&orders);

        let report = EvaluationReport {
            market_id: market.market_id.clone(),
            winner: self.config.winner,
            snapshots: market.snapshots.len(),
            bet_count: orders.count(),
            forecast: forecast_test(&orders, &market.forecast),
            last_traded: last_traded_test(&orders),
            threshold_opportunities: threshold_opportunities(&market.snapshots, &limits),
            settlement: settle_final(&market.snapshots, self.config.winner),
            limits,
        };

        info!(
            "Market {}: {} bets, profit {:.2} on {:.2} staked",
            report.market_id, report.bet_count, report.settlement.profit, report.settlement.staked
        );

        Ok(report)
    }

    /// Print summary of an evaluation report
    pub fn print_summary(&self, report: &EvaluationReport) {
        println!("\n{}", "=".repeat(60));
        println!("MARKET EVALUATION");
        println!("{}", "=".repeat(60));
        println!("Market: {}", report.market_id);
        println!("Winner: {}", report.winner);
        println!("Snapshots: {}", report.snapshots);
        println!("{}", "-".repeat(60));
        println!("Threshold opportunities: {}", report.threshold_opportunities);
        println!("Bet count: {}", report.bet_count);
        println!("{}", "-".repeat(60));
        print_tally("Test forecasted", &report.forecast);
        print_tally("Test lastprice", &report.last_traded);
        println!("{}", "-".repeat(60));
        println!(
            "Profit: £{}, Staked: {}",
            report.settlement.profit as i64, report.settlement.staked as i64
        );
        println!("ROI: {:.1}%", report.settlement.roi() * 100.0);
        println!("{}", "=".repeat(60));
    }
}

fn print_tally(label: &str, tally: &HypothesisTally) {
    println!(
        "{}: back {}/{} lay {}/{} (n/a {}, hold rate {:.1}%)",
        label,
        tally.back_holds,
        tally.back_holds + tally.back_fails,
        tally.lay_holds,
        tally.lay_holds + tally.lay_fails,
        tally.not_applicable,
        tally.hold_rate() * 100.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_market_log, LoadOptions};
    use crate::models::{Order, RunnerState, Side, Snapshot};

    fn snapshot(runners: Vec<RunnerState>) -> Snapshot {
        Snapshot {
            market_id: "1.5".to_string(),
            runners,
        }
    }

    fn sample_market() -> MarketLog {
        let mut market = MarketLog::new("1.5");
        market.forecast.insert(1, 3.5);
        market.forecast.insert(2, 6.0);
        market.snapshots = vec![
            snapshot(vec![
                RunnerState::new(1)
                    .with_last_price_traded(3.6)
                    .with_ladders(&[3.6], &[3.7]),
                RunnerState::new(2)
                    .with_last_price_traded(6.2)
                    .with_ladders(&[6.0], &[6.4]),
            ]),
            snapshot(vec![
                RunnerState::new(1)
                    .with_last_price_traded(3.7)
                    .with_orders(vec![Order::new("a", Side::Back, 3.8)])
                    .with_ladders(&[3.8], &[3.9]),
                RunnerState::new(2)
                    .with_last_price_traded(6.0)
                    .with_orders(vec![Order::new("b", Side::Lay, 6.4)])
                    .with_ladders(&[6.2], &[6.4]),
            ]),
            snapshot(vec![
                RunnerState::new(1)
                    .with_last_price_traded(3.9)
                    .with_orders(vec![Order::new("a", Side::Back, 3.8).matched(10.0, 3.8)])
                    .with_ladders(&[3.9], &[4.0]),
                RunnerState::new(2)
                    .with_last_price_traded(6.4)
                    .with_orders(vec![Order::new("b", Side::Lay, 6.4).matched(5.0, 6.4)])
                    .with_ladders(&[6.6], &[6.8]),
            ]),
        ];
        market
    }

    #[test]
    fn test_evaluation_config_default() {
        let config = EvaluationConfig::default();
        assert_eq!(config.market_id, "1.170226122");
        assert_eq!(config.winner, 27157433);
    }

    #[test]
    fn test_evaluate_sample_market() {
        let evaluator = MarketEvaluator::new(EvaluationConfig {
            market_id: "1.5".to_string(),
            winner: 1,
        });
        let report = evaluator.evaluate(&sample_market()).unwrap();

        assert_eq!(report.snapshots, 3);
        assert_eq!(report.bet_count, 2);
        assert_eq!(report.limits[&1].min_back, Some(3.8));
        assert_eq!(report.limits[&2].max_lay, Some(6.4));

        // back 3.8 >= 3.5, lay 6.4 > 6.0
        assert_eq!(report.forecast.back_holds, 1);
        assert_eq!(report.forecast.lay_fails, 1);

        // back 3.8 vs last 3.6, lay 6.4 vs last 6.2
        assert_eq!(report.last_traded.back_holds, 1);
        assert_eq!(report.last_traded.lay_fails, 1);

        // runner 1 back quotes 3.6, 3.8, 3.9 vs 3.8; runner 2 lay quotes 6.4, 6.4, 6.8 vs 6.4
        assert_eq!(report.threshold_opportunities, 4);

        // 10 * 2.8 + 5
        assert!((report.settlement.profit - 33.0).abs() < 1e-9);
        assert!((report.settlement.staked - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_run_unknown_market() {
        let evaluator = MarketEvaluator::new(EvaluationConfig::default());
        let err = evaluator.run(&SnapshotStore::new()).unwrap_err();
        assert!(matches!(err, EvalError::UnknownMarket(id) if id == "1.170226122"));
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let mut store = SnapshotStore::new();
        store.insert(sample_market());
        let evaluator = MarketEvaluator::new(EvaluationConfig {
            market_id: "1.5".to_string(),
            winner: 2,
        });

        let first = evaluator.run(&store).unwrap();
        let second = evaluator.run(&store).unwrap();
        assert_eq!(first, second);
        assert_eq!(evaluator.extract(&store).unwrap(), evaluator.extract(&store).unwrap());
    }

    #[test]
    fn test_pipeline_from_log_text() {
        let log = [
            r#"{"app_data": {"marketId": "1.8", "description": {}, "runners": [{"selectionId": 4, "metadata": {"FORECASTPRICE_NUMERATOR": "3", "FORECASTPRICE_DENOMINATOR": "1"}}]}}"#,
            r#"{"app_data": {"marketId": "1.8", "status": "OPEN", "runners": [{"selectionId": 4, "orders": null, "lastPriceTraded": 4.2, "ex": {"availableToBack": [{"price": 4.1}], "availableToLay": [{"price": 4.3}]}}]}}"#,
            r#"{"app_data": {"marketId": "1.8", "status": "OPEN", "runners": [{"selectionId": 4, "orders": [{"betId": "x", "side": "BACK", "price": 4.4, "sizeMatched": 2.0, "avgPriceMatched": 4.5}], "lastPriceTraded": 4.4, "ex": {"availableToBack": [{"price": 4.4}], "availableToLay": [{"price": 4.5}]}}]}}"#,
            r#"{"app_data": {"marketId": "1.8", "status": "CLOSED", "runners": []}}"#,
        ]
        .join("\n");

        let (store, _) = parse_market_log(&log, &LoadOptions::default()).unwrap();
        let evaluator = MarketEvaluator::new(EvaluationConfig {
            market_id: "1.8".to_string(),
            winner: 9,
        });
        let report = evaluator.run(&store).unwrap();

        assert_eq!(report.snapshots, 2);
        assert_eq!(report.bet_count, 1);
        assert_eq!(report.forecast.back_holds, 1);
        assert_eq!(report.last_traded.back_holds, 1);
        assert_eq!(report.threshold_opportunities, 1);
        assert!((report.settlement.profit + 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_serializes() {
        let evaluator = MarketEvaluator::new(EvaluationConfig {
            market_id: "1.5".to_string(),
            winner: 1,
        });
        let report = evaluator.evaluate(&sample_market()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"bet_count\":2"));
    }
}

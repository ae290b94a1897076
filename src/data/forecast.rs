//! Forecast prices from market description metadata

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::{integer_from_string_or_number, SelectionId};

/// Forecast metadata attached to a runner in the description record
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastMetadata {
    #[serde(rename = "FORECASTPRICE_NUMERATOR", deserialize_with = "integer_from_string_or_number")]
    pub numerator: i64,
    #[serde(rename = "FORECASTPRICE_DENOMINATOR", deserialize_with = "integer_from_string_or_number")]
    pub denominator: i64,
}

/// Runner entry of a description record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescribedRunner {
    pub selection_id: SelectionId,
    pub metadata: ForecastMetadata,
}

/// Convert fractional odds to decimal odds
///
/// Returns `None` for a zero denominator.
///
/// # Examples
/// ```
/// use betlog::data::forecast::fractional_to_decimal;
/// assert_eq!(fractional_to_decimal(5, 2), Some(3.5));
/// ```
pub fn fractional_to_decimal(numerator: i64, denominator: i64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some(numerator as f64 / denominator as f64 + 1.0)
}

/// Derive per-runner forecast decimal odds
///
/// Fails with the offending selection id if any runner has a zero denominator.
pub fn forecast_prices(
    runners: &[DescribedRunner],
) -> Result<HashMap<SelectionId, f64>, SelectionId> {
    runners
        .iter()
        .map(|r| {
            fractional_to_decimal(r.metadata.numerator, r.metadata.denominator)
                .map(|odds| (r.selection_id, odds))
                .ok_or(r.selection_id)
        })
        .collect()
}

//! Line-delimited JSON market log loading
//!
//! Each line is an envelope whose `app_data` is either a market description
//! (carries forecast metadata) or a market status update. Only `OPEN` status
//! updates are kept, in file order, as snapshots of their market.

use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::forecast::{forecast_prices, DescribedRunner};
use super::store::SnapshotStore;
use crate::error::LoadError;
use crate::models::{SelectionId, Snapshot};

/// Log line envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    app_data: Value,
}

/// Decoded content of one log line
#[derive(Debug)]
enum Record {
    Description {
        market_id: String,
        runners: Vec<DescribedRunner>,
    },
    Open(Snapshot),
    Ignored,
}

/// Loader behaviour
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Abort on the first malformed line instead of skipping it
    pub strict: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { strict: true }
    }
}

/// Counters collected while loading
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub lines: usize,
    pub descriptions: usize,
    pub snapshots: usize,
    /// Well-formed records that are neither descriptions nor OPEN updates
    pub ignored: usize,
    /// Malformed lines dropped in non-strict mode
    pub skipped: usize,
}

/// Load a market log file
pub fn load_market_log<P: AsRef<Path>>(
    path: P,
    options: &LoadOptions,
) -> Result<(SnapshotStore, LoadStats), LoadError> {
    let path = path.as_ref();
    info!("Loading market log from {:?}", path);

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    parse_market_log(&content, options)
}

/// Parse market log content already in memory
pub fn parse_market_log(
    content: &str,
    options: &LoadOptions,
) -> Result<(SnapshotStore, LoadStats), LoadError> {
    let mut store = SnapshotStore::new();
    let mut stats = LoadStats::default();

    for (idx, text) in content.lines().enumerate() {
        let line = idx + 1;
        if text.trim().is_empty() {
            continue;
        }
        stats.lines += 1;

        let record = match parse_record(line, text) {
            Ok(record) => record,
            Err(e) if !options.strict => {
                warn!("Skipping line {}: {}", line, e);
                stats.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match record {
            Record::Description { market_id, runners } => {
                let forecast = forecast_prices(&runners).map_err(|selection_id| {
                    zero_denominator(line, selection_id)
                });
                let forecast = match forecast {
                    Ok(f) => f,
                    Err(e) if !options.strict => {
                        warn!("Skipping line {}: {}", line, e);
                        stats.skipped += 1;
                        continue;
                    }
                    Err(e) => return Err(e),
                };
                debug!(
                    "Description for market {} with {} runners",
                    market_id,
                    forecast.len()
                );
                store.market_mut(&market_id).forecast = forecast;
                stats.descriptions += 1;
            }
            Record::Open(snapshot) => {
                let market_id = snapshot.market_id.clone();
                store.market_mut(&market_id).snapshots.push(snapshot);
                stats.snapshots += 1;
            }
            Record::Ignored => stats.ignored += 1,
        }
    }

    info!(
        "Loaded {} markets: {} descriptions, {} open snapshots, {} ignored, {} skipped",
        store.len(),
        stats.descriptions,
        stats.snapshots,
        stats.ignored,
        stats.skipped
    );

    Ok((store, stats))
}

fn zero_denominator(line: usize, selection_id: SelectionId) -> LoadError {
    LoadError::MalformedRecord {
        line,
        reason: format!("runner {} has a zero forecast denominator", selection_id),
    }
}

/// Classify and decode a single line
fn parse_record(line: usize, text: &str) -> Result<Record, LoadError> {
    let json_err = |source| LoadError::Json { line, source };

    let envelope: Envelope = serde_json::from_str(text).map_err(json_err)?;
    let app_data = envelope.app_data;

    let object = app_data
        .as_object()
        .ok_or_else(|| malformed(line, "app_data is not an object"))?;

    if let Some(description) = object.get("description") {
        let market_id = object
            .get("marketId")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(line, "description record without marketId"))?
            .to_string();

        let runners = object
            .get("runners")
            .or_else(|| description.get("runners"))
            .ok_or_else(|| malformed(line, "description record without runners"))?;
        let runners: Vec<DescribedRunner> =
            serde_json::from_value(runners.clone()).map_err(json_err)?;

        return Ok(Record::Description { market_id, runners });
    }

    let is_open = object.get("status").and_then(Value::as_str) == Some("OPEN");
    if !is_open {
        return Ok(Record::Ignored);
    }

    let snapshot: Snapshot = serde_json::from_value(app_data).map_err(json_err)?;
    Ok(Record::Open(snapshot))
}

fn malformed(line: usize, reason: &str) -> LoadError {
    LoadError::MalformedRecord {
        line,
        reason: reason.to_string(),
    }
}

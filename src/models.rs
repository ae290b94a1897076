use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Exchange runner identifier (`selectionId`)
pub type SelectionId = u64;

/// Exchange order identifier (`betId`)
pub type BetId = String;

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Back,
    Lay,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Back => write!(f, "BACK"),
            Side::Lay => write!(f, "LAY"),
        }
    }
}

/// A single order as reported in a runner's order book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(deserialize_with = "bet_id_from_string_or_number")]
    pub bet_id: BetId,
    pub side: Side,
    pub price: f64,
    #[serde(default)]
    pub size_matched: f64,
    #[serde(default)]
    pub avg_price_matched: f64,
}

impl Order {
    pub fn new(bet_id: &str, side: Side, price: f64) -> Self {
        Self {
            bet_id: bet_id.to_string(),
            side,
            price,
            size_matched: 0.0,
            avg_price_matched: 0.0,
        }
    }

    pub fn matched(mut self, size: f64, avg_price: f64) -> Self {
        self.size_matched = size;
        self.avg_price_matched = avg_price;
        self
    }
}

/// One rung of an exchange price ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSize {
    pub price: f64,
    #[serde(default)]
    pub size: f64,
}

/// Prices currently offered on the exchange for a runner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangePrices {
    #[serde(default)]
    pub available_to_back: Vec<PriceSize>,
    #[serde(default)]
    pub available_to_lay: Vec<PriceSize>,
}

impl ExchangePrices {
    /// Lowest price on the back ladder
    pub fn back_quote(&self) -> Option<f64> {
        self.available_to_back
            .iter()
            .map(|p| p.price)
            .reduce(f64::min)
    }

    /// Highest price on the lay ladder
    pub fn lay_quote(&self) -> Option<f64> {
        self.available_to_lay
            .iter()
            .map(|p| p.price)
            .reduce(f64::max)
    }
}

/// Full state of one runner at one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerState {
    pub selection_id: SelectionId,
    /// `null` in the log when the runner has no orders
    #[serde(default, deserialize_with = "null_as_empty")]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub last_price_traded: Option<f64>,
    #[serde(default)]
    pub ex: ExchangePrices,
}

impl RunnerState {
    pub fn new(selection_id: SelectionId) -> Self {
        Self {
            selection_id,
            orders: Vec::new(),
            last_price_traded: None,
            ex: ExchangePrices::default(),
        }
    }

    pub fn with_orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_last_price_traded(mut self, price: f64) -> Self {
        self.last_price_traded = Some(price);
        self
    }

    pub fn with_ladders(mut self, backs: &[f64], lays: &[f64]) -> Self {
        let rungs = |prices: &[f64]| -> Vec<PriceSize> {
            prices
                .iter()
                .map(|&price| PriceSize { price, size: 0.0 })
                .collect()
        };
        self.ex = ExchangePrices {
            available_to_back: rungs(backs),
            available_to_lay: rungs(lays),
        };
        self
    }
}

/// One OPEN status observation of a market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub market_id: String,
    #[serde(default)]
    pub runners: Vec<RunnerState>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Unsigned(u64),
    Signed(i64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Unsigned(n) => n.to_string(),
            StringOrNumber::Signed(n) => n.to_string(),
        }
    }
}

fn bet_id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrNumber::deserialize(deserializer)?.into_string())
}

/// Integer fields that the exchange sometimes encodes as strings
pub(crate) fn integer_from_string_or_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected integer, got {:?}", s))),
        StringOrNumber::Unsigned(n) => i64::try_from(n).map_err(D::Error::custom),
        StringOrNumber::Signed(n) => Ok(n),
    }
}

//! Parsing of Alpha Vantage time series payloads into quotes.
//!
//! Stock payloads look like:
//!
//! ```json
//! {"Meta Data": {"2. Symbol": "NASDX", ...},
//!  "Time Series (Daily)": {"2024-09-19": {"1. open": "39.90", "4. close": "39.90", ...}}}
//! ```
//!
//! Crypto payloads carry `"2. Digital Currency Code"` in the metadata and a
//! `"Time Series (Digital Currency Daily)"` object.

use crate::error::{DataError, Result};
use crate::quote::{DEFAULT_CURRENCY, DEFAULT_NAMESPACE, Quote};
use chrono::NaiveDate;
use serde_json::{Map, Value};

const META_DATA: &str = "Meta Data";
const ERROR_MESSAGE: &str = "Error Message";
const NOTICE_KEYS: [&str; 2] = ["Note", "Information"];
const TAG_STOCKS: &str = "2. Symbol";
const TAG_CRYPTO: &str = "2. Digital Currency Code";
const STOCK_SERIES: [&str; 2] = ["Time Series (Daily)", "Weekly Time Series"];
const CRYPTO_SERIES: [&str; 2] = [
    "Time Series (Digital Currency Daily)",
    "Time Series (Digital Currency Weekly)",
];

/// Kind of instrument a payload describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    /// Equities and funds
    Stock,
    /// Digital currencies
    Crypto,
}

/// A parsed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSeries {
    /// Symbol from the payload metadata
    pub symbol: String,
    /// Instrument kind
    pub asset_class: AssetClass,
    /// Quotes sorted by date
    pub quotes: Vec<Quote>,
}

/// Converts raw payloads into quotes.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    earliest: Option<NaiveDate>,
    namespace: String,
    currency: String,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self {
            earliest: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl ResponseParser {
    /// Create a parser that keeps every date.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only keep quotes dated strictly after `earliest`.
    pub const fn with_earliest(mut self, earliest: NaiveDate) -> Self {
        self.earliest = Some(earliest);
        self
    }

    /// Namespace attached to parsed quotes.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Currency attached to parsed quotes.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Parse a single payload.
    pub fn parse(&self, payload: &Value) -> Result<ParsedSeries> {
        let object = payload
            .as_object()
            .ok_or_else(|| DataError::Api("Payload is not a JSON object".to_string()))?;

        if let Some(message) = object.get(ERROR_MESSAGE) {
            return Err(DataError::Api(value_text(message)));
        }

        let Some(meta) = object.get(META_DATA).and_then(Value::as_object) else {
            let notice = NOTICE_KEYS
                .iter()
                .find_map(|key| object.get(*key))
                .map(value_text);
            return Err(DataError::Api(notice.unwrap_or_else(|| {
                format!("Missing {:?}, keys: {:?}", META_DATA, object.keys())
            })));
        };

        let (symbol, asset_class, series_keys) = if let Some(symbol) = meta.get(TAG_STOCKS) {
            (value_text(symbol), AssetClass::Stock, &STOCK_SERIES)
        } else if let Some(symbol) = meta.get(TAG_CRYPTO) {
            (value_text(symbol), AssetClass::Crypto, &CRYPTO_SERIES)
        } else {
            return Err(DataError::Api(format!(
                "Unrecognized metadata keys: {:?}",
                meta.keys()
            )));
        };

        let series = series_keys
            .iter()
            .find_map(|key| object.get(*key).and_then(Value::as_object))
            .ok_or_else(|| DataError::MissingData {
                symbol: symbol.clone(),
                reason: "No time series in payload".to_string(),
            })?;

        tracing::debug!(%symbol, ?asset_class, rows = series.len(), "parsing time series");

        let mut quotes = Vec::with_capacity(series.len());
        for (date, fields) in series {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|e| DataError::Parse(format!("Invalid date {}: {}", date, e)))?;
            if self.earliest.is_some_and(|earliest| date <= earliest) {
                continue;
            }
            let close = close_field(&symbol, date, fields)?;
            quotes.push(Quote {
                date,
                symbol: symbol.clone(),
                namespace: self.namespace.clone(),
                close,
                currency: self.currency.clone(),
            });
        }
        quotes.sort_by_key(|q| q.date);

        Ok(ParsedSeries {
            symbol,
            asset_class,
            quotes,
        })
    }

    /// Parse a batch of payloads, logging and skipping the ones that fail.
    pub fn parse_all(&self, payloads: &[Value]) -> Vec<ParsedSeries> {
        payloads
            .iter()
            .filter_map(|payload| match self.parse(payload) {
                Ok(series) => {
                    tracing::info!(
                        symbol = %series.symbol,
                        quotes = series.quotes.len(),
                        "processed payload"
                    );
                    Some(series)
                }
                Err(e) => {
                    tracing::error!(error = %e, "skipping payload");
                    None
                }
            })
            .collect()
    }
}

/// The close is the field whose label (after the `"4. "` style prefix) starts with
/// "close"; crypto payloads may label it `"4a. close (USD)"`.
fn close_field(symbol: &str, date: NaiveDate, fields: &Value) -> Result<f64> {
    let fields: &Map<String, Value> = fields.as_object().ok_or_else(|| {
        DataError::Parse(format!("{} {}: row is not an object", symbol, date))
    })?;

    let raw = fields
        .iter()
        .find(|(key, _)| {
            key.split_once(". ")
                .is_some_and(|(_, label)| label.starts_with("close"))
        })
        .map(|(_, value)| value)
        .ok_or_else(|| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: format!("No close on {}", date),
        })?;

    match raw {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| DataError::Parse(format!("{} {}: close {:?}: {}", symbol, date, s, e))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DataError::Parse(format!("{} {}: close {}", symbol, date, n))),
        other => Err(DataError::Parse(format!(
            "{} {}: unexpected close {}",
            symbol, date, other
        ))),
    }
}

fn value_text(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), |s| s.trim().to_string())
}

//! Closing price quotes and their long-format DataFrame representation.

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Exchange tag attached to quotes when the source does not provide one.
pub const DEFAULT_NAMESPACE: &str = "NASDAQ";

/// Currency attached to quotes when the source does not provide one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// A single closing price observation.
///
/// Quotes are keyed by `(date, symbol, namespace)`. A later observation for the same
/// key replaces the close, never the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Trading date
    pub date: NaiveDate,
    /// Ticker symbol
    pub symbol: String,
    /// Exchange tag (e.g. "NASDAQ")
    pub namespace: String,
    /// Closing price
    pub close: f64,
    /// ISO 4217 currency code
    pub currency: String,
}

impl Quote {
    /// Create a quote in the default namespace and currency.
    pub fn new(date: NaiveDate, symbol: impl Into<String>, close: f64) -> Self {
        Self {
            date,
            symbol: symbol.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            close,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    /// Replace the namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Replace the currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// The unique key of this quote.
    pub fn key(&self) -> (NaiveDate, &str, &str) {
        (self.date, &self.symbol, &self.namespace)
    }
}

/// Convert quotes into a long-format DataFrame.
///
/// Columns: date, symbol, namespace, close, currency.
pub fn quotes_to_frame(quotes: &[Quote]) -> Result<DataFrame> {
    let dates: Vec<String> = quotes.iter().map(|q| q.date.to_string()).collect();
    let symbols: Vec<&str> = quotes.iter().map(|q| q.symbol.as_str()).collect();
    let namespaces: Vec<&str> = quotes.iter().map(|q| q.namespace.as_str()).collect();
    let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
    let currencies: Vec<&str> = quotes.iter().map(|q| q.currency.as_str()).collect();

    let df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("symbol".into(), symbols).into(),
        Series::new("namespace".into(), namespaces).into(),
        Series::new("close".into(), closes).into(),
        Series::new("currency".into(), currencies).into(),
    ])?;

    // Convert date strings to Date type
    let df = df
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?;

    Ok(df)
}

/// Read quotes back from a long-format DataFrame.
///
/// `date`, `symbol` and `close` are required. `namespace` and `currency` fall back to
/// the defaults when the columns are absent. Rows with a null close are skipped.
pub fn quotes_from_frame(df: &DataFrame) -> Result<Vec<Quote>> {
    let dates = df.column("date")?.cast(&DataType::String)?;
    let dates = dates.str()?;
    let symbols = df.column("symbol")?.str()?;
    let closes = df.column("close")?.cast(&DataType::Float64)?;
    let closes = closes.f64()?;
    let namespaces = df.column("namespace").ok().and_then(|c| c.str().ok());
    let currencies = df.column("currency").ok().and_then(|c| c.str().ok());

    let mut quotes = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let Some(close) = closes.get(i) else {
            continue;
        };
        let date = dates
            .get(i)
            .ok_or_else(|| DataError::Parse("Missing date".to_string()))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Invalid date {}: {}", date, e)))?;
        let symbol = symbols
            .get(i)
            .ok_or_else(|| DataError::Parse("Missing symbol".to_string()))?;

        let mut quote = Quote::new(date, symbol, close);
        if let Some(namespace) = namespaces.and_then(|c| c.get(i)) {
            quote.namespace = namespace.to_string();
        }
        if let Some(currency) = currencies.and_then(|c| c.get(i)) {
            quote.currency = currency.to_string();
        }
        quotes.push(quote);
    }

    Ok(quotes)
}

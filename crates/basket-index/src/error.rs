//! Error types for index construction and valuation.

use chrono::NaiveDate;
use polars::error::PolarsError;
use thiserror::Error;

/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors raised while loading, building or valuing indexes.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Malformed or inconsistent index definition
    #[error("Invalid index {index}: {reason}")]
    Config {
        /// Index name, or a placeholder when the entry has none
        index: String,
        /// What is wrong with the entry
        reason: String,
    },

    /// A member has no price at the index start date
    #[error("No start price for {symbol} on {date}")]
    MissingStartPrice {
        /// Member symbol
        symbol: String,
        /// Resolved start date
        date: NaiveDate,
    },

    /// A member's start price cannot be divided by
    #[error("Start price for {symbol} on {date} must be positive, got {price}")]
    InvalidStartPrice {
        /// Member symbol
        symbol: String,
        /// Resolved start date
        date: NaiveDate,
        /// Offending price
        price: f64,
    },

    /// A point-in-time lookup found no price
    #[error("No price for {symbol} on {date}")]
    MissingPrice {
        /// Symbol looked up
        symbol: String,
        /// Date looked up
        date: NaiveDate,
    },

    /// The price table holds no dates
    #[error("Price table is empty")]
    EmptyPriceTable,

    /// Start date after end date
    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange {
        /// Start date
        start: NaiveDate,
        /// End date
        end: NaiveDate,
    },

    /// Not enough observations for a statistic
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// No index with this name
    #[error("Unknown index: {0}")]
    UnknownIndex(String),

    /// Quote conversion error
    #[error("Data error: {0}")]
    Data(#[from] basket_data::DataError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

impl IndexError {
    pub(crate) fn config(index: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            index: index.into(),
            reason: reason.into(),
        }
    }
}

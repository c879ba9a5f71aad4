//! Daily revaluation of portfolios and benchmark holdings.

use crate::error::{IndexError, Result};
use crate::portfolio::Portfolio;
use crate::price_table::PriceTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named date → value series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeries {
    name: String,
    values: BTreeMap<NaiveDate, f64>,
}

impl IndexSeries {
    /// Build a series from `(date, value)` pairs. A repeated date keeps the last value.
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Series name (index name, or `<symbol>_comparison` for benchmarks).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value on `date`.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.values.get(&date).copied()
    }

    /// `(date, value)` pairs ascending by date.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }

    /// First `(date, value)`.
    pub fn first(&self) -> Option<(NaiveDate, f64)> {
        self.values.first_key_value().map(|(d, v)| (*d, *v))
    }

    /// Last `(date, value)`.
    pub fn last(&self) -> Option<(NaiveDate, f64)> {
        self.values.last_key_value().map(|(d, v)| (*d, *v))
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the series has no dates.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A single-symbol holding to compare an index against.
///
/// Zero shares means "size the holding to the portfolio value at the start date".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    /// Reference symbol
    pub symbol: String,
    /// Shares held, or 0 to auto-size
    pub shares: f64,
}

impl Benchmark {
    /// Benchmark holding a fixed number of shares.
    pub fn new(symbol: impl Into<String>, shares: f64) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
        }
    }

    /// Benchmark sized to the portfolio value at the start date.
    pub fn auto_sized(symbol: impl Into<String>) -> Self {
        Self::new(symbol, 0.0)
    }

    /// Column name used for this benchmark in comparisons.
    pub fn series_name(&self) -> String {
        format!("{}_comparison", self.symbol)
    }
}

/// Values portfolios against a price table.
#[derive(Debug, Clone, Copy)]
pub struct IndexValuator {
    portfolio_value: f64,
}

impl IndexValuator {
    /// Valuator auto-sizing benchmarks to `portfolio_value`.
    pub const fn new(portfolio_value: f64) -> Self {
        Self { portfolio_value }
    }

    /// Value of `portfolio` on every date where at least one member is priced.
    ///
    /// A member without a price on a date contributes nothing on that date.
    pub fn value_series(&self, portfolio: &Portfolio, prices: &PriceTable) -> IndexSeries {
        let values = prices.dates().filter_map(|date| {
            let mut priced = false;
            let mut total = 0.0;
            for holding in portfolio.holdings() {
                if let Some(price) = prices.get(&holding.symbol, date) {
                    priced = true;
                    total += holding.shares * price;
                }
            }
            priced.then_some((date, total))
        });

        let series = IndexSeries::new(portfolio.name(), values);
        tracing::debug!(index = %portfolio.name(), dates = series.len(), "valued index");
        series
    }

    /// Value of `portfolio` on `date`. Fails if any member is unpriced that day.
    pub fn value_at(
        &self,
        portfolio: &Portfolio,
        prices: &PriceTable,
        date: NaiveDate,
    ) -> Result<f64> {
        portfolio
            .holdings()
            .iter()
            .map(|h| prices.price_at(&h.symbol, date).map(|p| h.shares * p))
            .sum()
    }

    /// Shares the benchmark holds, sizing a zero-share benchmark at `start_date`.
    pub fn benchmark_shares(
        &self,
        benchmark: &Benchmark,
        start_date: NaiveDate,
        prices: &PriceTable,
    ) -> Result<f64> {
        if benchmark.shares != 0.0 {
            return Ok(benchmark.shares);
        }
        let price = prices
            .get(&benchmark.symbol, start_date)
            .ok_or_else(|| IndexError::MissingStartPrice {
                symbol: benchmark.symbol.clone(),
                date: start_date,
            })?;
        if price <= 0.0 {
            return Err(IndexError::InvalidStartPrice {
                symbol: benchmark.symbol.clone(),
                date: start_date,
                price,
            });
        }
        Ok(self.portfolio_value / price)
    }

    /// Value of the benchmark holding on every date its symbol is priced.
    pub fn benchmark_series(
        &self,
        benchmark: &Benchmark,
        start_date: NaiveDate,
        prices: &PriceTable,
    ) -> Result<IndexSeries> {
        let shares = self.benchmark_shares(benchmark, start_date, prices)?;
        tracing::info!(symbol = %benchmark.symbol, shares, "benchmark holding");

        let values = prices
            .series(&benchmark.symbol)
            .into_iter()
            .map(|(date, price)| (date, shares * price));
        Ok(IndexSeries::new(benchmark.series_name(), values))
    }
}

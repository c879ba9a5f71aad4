//! Wide date × symbol table of closing prices.
//!
//! Built once per run from long-format quotes and never mutated afterwards. A symbol
//! with no close on a date is absent from that row; absence is never stored as zero.

use crate::error::{IndexError, Result};
use basket_data::{Quote, quotes_from_frame};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Immutable table of closes keyed by date, then symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    rows: BTreeMap<NaiveDate, BTreeMap<String, f64>>,
    symbols: BTreeSet<String>,
}

/// Result of narrowing a table to a requested symbol list.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Table restricted to requested symbols that have at least one price
    pub table: PriceTable,
    /// Requested symbols with no price anywhere in the history
    pub missing: Vec<String>,
}

/// Summary of one symbol's closes.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolStatistics {
    /// Symbol
    pub symbol: String,
    /// Number of priced dates
    pub count: usize,
    /// Mean close
    pub mean: f64,
    /// Sample standard deviation of closes (0 for a single observation)
    pub std_dev: f64,
    /// Lowest close
    pub min: f64,
    /// Highest close
    pub max: f64,
    /// First priced date
    pub first_date: NaiveDate,
    /// Last priced date
    pub last_date: NaiveDate,
}

impl PriceTable {
    /// Pivot quotes into a table.
    ///
    /// A repeated `(date, symbol)` pair keeps the last quote in iteration order. A quote
    /// with a non-finite close registers its date and symbol but leaves the cell empty.
    pub fn build<'a, I>(quotes: I) -> Self
    where
        I: IntoIterator<Item = &'a Quote>,
    {
        let mut table = Self::default();
        for quote in quotes {
            let row = table.rows.entry(quote.date).or_default();
            if quote.close.is_finite() {
                row.insert(quote.symbol.clone(), quote.close);
            } else {
                row.remove(&quote.symbol);
            }
            if !table.symbols.contains(&quote.symbol) {
                table.symbols.insert(quote.symbol.clone());
            }
        }
        table
    }

    /// Pivot a long-format frame with `date`, `symbol` and `close` columns.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let quotes = quotes_from_frame(df)?;
        Ok(Self::build(&quotes))
    }

    /// Remove symbols that have no price on any date. Rows are kept even when empty.
    pub fn drop_empty_columns(mut self) -> Self {
        let observed: BTreeSet<String> = self
            .rows
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect();
        self.symbols = observed;
        self
    }

    /// Restrict the table to `symbols` and report the ones with no data at all.
    pub fn select<S: AsRef<str>>(&self, symbols: &[S]) -> Selection {
        let wanted: BTreeSet<&str> = symbols.iter().map(AsRef::as_ref).collect();

        let rows = self
            .rows
            .iter()
            .map(|(date, row)| {
                let kept = row
                    .iter()
                    .filter(|(symbol, _)| wanted.contains(symbol.as_str()))
                    .map(|(symbol, price)| (symbol.clone(), *price))
                    .collect();
                (*date, kept)
            })
            .collect();
        let columns = self
            .symbols
            .iter()
            .filter(|symbol| wanted.contains(symbol.as_str()))
            .cloned()
            .collect();

        let table = Self {
            rows,
            symbols: columns,
        }
        .drop_empty_columns();

        let mut seen = BTreeSet::new();
        let missing: Vec<String> = symbols
            .iter()
            .map(AsRef::as_ref)
            .filter(|symbol| !table.has_symbol(symbol) && seen.insert(*symbol))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            tracing::warn!(?missing, "missing price data for symbols");
        }

        Selection { table, missing }
    }

    /// Close of `symbol` on `date`.
    pub fn price_at(&self, symbol: &str, date: NaiveDate) -> Result<f64> {
        self.get(symbol, date).ok_or_else(|| IndexError::MissingPrice {
            symbol: symbol.to_string(),
            date,
        })
    }

    /// Close of `symbol` on `date`, if any.
    pub fn get(&self, symbol: &str, date: NaiveDate) -> Option<f64> {
        self.rows.get(&date).and_then(|row| row.get(symbol)).copied()
    }

    /// All closes on `date`.
    pub fn row(&self, date: NaiveDate) -> Option<&BTreeMap<String, f64>> {
        self.rows.get(&date)
    }

    /// Whether `symbol` is a column of the table.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Column symbols in ascending order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    /// Earliest date in the table.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next().copied()
    }

    /// Latest date in the table.
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.keys().next_back().copied()
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no dates.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Priced `(date, close)` pairs for one symbol, ascending by date.
    pub fn series(&self, symbol: &str) -> Vec<(NaiveDate, f64)> {
        self.rows
            .iter()
            .filter_map(|(date, row)| row.get(symbol).map(|price| (*date, *price)))
            .collect()
    }

    /// Per-symbol statistics for every column with at least one price.
    pub fn describe(&self) -> Vec<SymbolStatistics> {
        self.symbols
            .iter()
            .filter_map(|symbol| {
                let series = self.series(symbol);
                let (first_date, _) = *series.first()?;
                let (last_date, _) = *series.last()?;
                let closes: Vec<f64> = series.iter().map(|(_, p)| *p).collect();
                let count = closes.len();
                let mean = closes.iter().sum::<f64>() / count as f64;
                let std_dev = if count > 1 {
                    let ss: f64 = closes.iter().map(|p| (p - mean).powi(2)).sum();
                    (ss / (count - 1) as f64).sqrt()
                } else {
                    0.0
                };
                Some(SymbolStatistics {
                    symbol: symbol.clone(),
                    count,
                    mean,
                    std_dev,
                    min: closes.iter().copied().fold(f64::INFINITY, f64::min),
                    max: closes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    first_date,
                    last_date,
                })
            })
            .collect()
    }

    /// Emit the wide table: a `date` column then one nullable column per symbol.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self.rows.keys().map(ToString::to_string).collect();
        let mut columns: Vec<Column> = vec![Series::new("date".into(), dates).into()];

        for symbol in &self.symbols {
            let values: Vec<Option<f64>> = self
                .rows
                .values()
                .map(|row| row.get(symbol).copied())
                .collect();
            columns.push(Series::new(symbol.as_str().into(), values).into());
        }

        let df = DataFrame::new(columns)?
            .lazy()
            .with_column(col("date").cast(DataType::Date))
            .collect()?;

        Ok(df)
    }
}

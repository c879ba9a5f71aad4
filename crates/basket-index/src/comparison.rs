//! Index vs. benchmark series aligned on business days.

use crate::calendar::business_days;
use crate::error::{IndexError, Result};
use crate::valuation::IndexSeries;
use chrono::NaiveDate;
use polars::prelude::*;

/// One aligned date. At least one of the two values is present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonRow {
    /// Business day
    pub date: NaiveDate,
    /// Index value
    pub index: Option<f64>,
    /// Benchmark value
    pub benchmark: Option<f64>,
}

impl ComparisonRow {
    /// Whether both values are present.
    pub const fn is_complete(&self) -> bool {
        self.index.is_some() && self.benchmark.is_some()
    }
}

/// Two aligned columns sorted ascending by date.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonSeries {
    index_name: String,
    benchmark_name: String,
    rows: Vec<ComparisonRow>,
}

impl ComparisonSeries {
    /// Name of the index column.
    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Name of the benchmark column.
    pub fn benchmark_name(&self) -> &str {
        &self.benchmark_name
    }

    /// All rows.
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Rows where both values are present.
    pub fn complete_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|r| r.is_complete())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `date`, index and benchmark columns; absent values are null.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let dates: Vec<String> = self.rows.iter().map(|r| r.date.to_string()).collect();
        let index: Vec<Option<f64>> = self.rows.iter().map(|r| r.index).collect();
        let benchmark: Vec<Option<f64>> = self.rows.iter().map(|r| r.benchmark).collect();

        let df = DataFrame::new(vec![
            Series::new("date".into(), dates).into(),
            Series::new(self.index_name.as_str().into(), index).into(),
            Series::new(self.benchmark_name.as_str().into(), benchmark).into(),
        ])?
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?;

        Ok(df)
    }
}

/// Align `index` and `benchmark` on business days from `start` to `end` inclusive.
///
/// Days where neither series has a value are dropped. Days where only one has a value
/// keep the other column absent.
pub fn compare(
    index: &IndexSeries,
    benchmark: &IndexSeries,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ComparisonSeries> {
    if start > end {
        return Err(IndexError::InvalidDateRange { start, end });
    }

    let rows: Vec<ComparisonRow> = business_days(start, end)
        .into_iter()
        .map(|date| ComparisonRow {
            date,
            index: index.get(date),
            benchmark: benchmark.get(date),
        })
        .filter(|row| row.index.is_some() || row.benchmark.is_some())
        .collect();

    tracing::debug!(
        index = %index.name(),
        benchmark = %benchmark.name(),
        rows = rows.len(),
        "aligned comparison"
    );

    Ok(ComparisonSeries {
        index_name: index.name().to_string(),
        benchmark_name: benchmark.name().to_string(),
        rows,
    })
}

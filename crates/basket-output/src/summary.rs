//! Return summary of an index against its benchmark.

use basket_index::ComparisonSeries;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Performance over the complete rows of a comparison.
///
/// Returns are measured between the first and the last row where both the index and
/// the benchmark have a value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonSummary {
    /// Index column name.
    pub index_name: String,

    /// Benchmark column name.
    pub benchmark_name: String,

    /// Total rows in the comparison.
    pub rows: usize,

    /// Rows with one column absent.
    pub partial_rows: usize,

    /// First complete date.
    pub start: Option<NaiveDate>,

    /// Last complete date.
    pub end: Option<NaiveDate>,

    /// Index return over the complete range.
    pub index_return: Option<f64>,

    /// Benchmark return over the complete range.
    pub benchmark_return: Option<f64>,
}

impl ComparisonSummary {
    /// Summarize a comparison series.
    pub fn from_series(series: &ComparisonSeries) -> Self {
        let mut complete = series.complete_rows();
        let first = complete.next().copied();
        let last = complete.last().copied().or(first);

        let ret = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) if a != 0.0 => Some(b / a - 1.0),
            _ => None,
        };

        let (index_return, benchmark_return) = match (first, last) {
            (Some(f), Some(l)) => (ret(f.index, l.index), ret(f.benchmark, l.benchmark)),
            _ => (None, None),
        };

        Self {
            index_name: series.index_name().to_string(),
            benchmark_name: series.benchmark_name().to_string(),
            rows: series.len(),
            partial_rows: series.rows().iter().filter(|r| !r.is_complete()).count(),
            start: first.map(|r| r.date),
            end: last.map(|r| r.date),
            index_return,
            benchmark_return,
        }
    }

    /// Index return minus benchmark return.
    pub fn excess_return(&self) -> Option<f64> {
        Some(self.index_return? - self.benchmark_return?)
    }
}

impl fmt::Display for ComparisonSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pct = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0));

        writeln!(f, "{} vs {}", self.index_name, self.benchmark_name)?;
        writeln!(f, "{}", "=".repeat(48))?;
        match (self.start, self.end) {
            (Some(start), Some(end)) => writeln!(f, "{:<24} {} to {}", "Period:", start, end)?,
            _ => writeln!(f, "{:<24} n/a", "Period:")?,
        }
        writeln!(
            f,
            "{:<24} {} ({} partial)",
            "Rows:", self.rows, self.partial_rows
        )?;
        writeln!(f, "{:<24} {}", "Index Return:", pct(self.index_return))?;
        writeln!(f, "{:<24} {}", "Benchmark Return:", pct(self.benchmark_return))?;
        writeln!(f, "{:<24} {}", "Excess Return:", pct(self.excess_return()))
    }
}

//! CSV and JSON export of comparisons, holdings and quotes.

use basket_data::Quote;
use basket_index::{ComparisonSeries, Portfolio};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One aligned comparison date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonRecord {
    /// Business day.
    pub date: NaiveDate,

    /// Index value, if priced.
    pub index: Option<f64>,

    /// Benchmark value, if priced.
    pub benchmark: Option<f64>,
}

/// Index vs. benchmark series ready for export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonExport {
    /// Index column name.
    pub index_name: String,

    /// Benchmark column name.
    pub benchmark_name: String,

    /// Rows ascending by date.
    pub rows: Vec<ComparisonRecord>,
}

impl ComparisonExport {
    /// Snapshot a comparison series.
    pub fn from_series(series: &ComparisonSeries) -> Self {
        Self {
            index_name: series.index_name().to_string(),
            benchmark_name: series.benchmark_name().to_string(),
            rows: series
                .rows()
                .iter()
                .map(|r| ComparisonRecord {
                    date: r.date,
                    index: r.index,
                    benchmark: r.benchmark,
                })
                .collect(),
        }
    }

    /// Conventional file name, e.g. `TECH_vs_FFIV_comparison.csv`.
    pub fn file_name(&self, format: ExportFormat) -> String {
        format!(
            "{}_vs_{}.{}",
            self.index_name,
            self.benchmark_name,
            format.extension()
        )
    }
}

impl Exporter for ComparisonExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.write_record(["date", self.index_name.as_str(), self.benchmark_name.as_str()])?;
                for row in &self.rows {
                    wtr.write_record([
                        row.date.to_string(),
                        optional(row.index),
                        optional(row.benchmark),
                    ])?;
                }
                into_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// A single holding of an index portfolio.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioHolding {
    /// Member symbol.
    pub symbol: String,

    /// Number of shares.
    pub shares: f64,

    /// Close at the start date.
    pub start_price: f64,

    /// Value at the start date.
    pub start_value: f64,

    /// Fraction of the portfolio start value (0.0 to 1.0).
    pub weight: f64,
}

/// Holdings of one index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortfolioExport {
    /// Index name.
    pub name: String,

    /// Date the holdings were sized at.
    pub start_date: NaiveDate,

    /// Value the holdings were sized to.
    pub target_value: f64,

    /// Holdings in member order.
    pub holdings: Vec<PortfolioHolding>,
}

impl PortfolioExport {
    /// Snapshot a portfolio.
    pub fn from_portfolio(portfolio: &Portfolio) -> Self {
        let holdings = portfolio
            .holdings()
            .iter()
            .zip(portfolio.weights())
            .map(|(h, (_, weight))| PortfolioHolding {
                symbol: h.symbol.clone(),
                shares: h.shares,
                start_price: h.start_price,
                start_value: h.start_value(),
                weight,
            })
            .collect();

        Self {
            name: portfolio.name().to_string(),
            start_date: portfolio.start_date(),
            target_value: portfolio.target_value(),
            holdings,
        }
    }

    /// Sum of holding weights (should be close to 1.0).
    pub fn total_weight(&self) -> f64 {
        self.holdings.iter().map(|h| h.weight).sum()
    }
}

impl Exporter for PortfolioExport {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut output = String::new();

                output.push_str(&format!("# Index: {}\n", self.name));
                output.push_str(&format!("# Start Date: {}\n", self.start_date));
                output.push_str(&format!("# Target Value: {}\n", self.target_value));

                let mut wtr = csv::Writer::from_writer(vec![]);
                for holding in &self.holdings {
                    wtr.serialize(holding)?;
                }
                output.push_str(&into_string(wtr)?);
                Ok(output)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

/// Quotes rendered as a GnuCash price import file.
///
/// The CSV form has no header: `date,namespace,symbol,close,currency`, one row per
/// quote, closes with six decimals.
#[derive(Debug, Clone, Copy)]
pub struct GnucashPrices<'a> {
    quotes: &'a [Quote],
}

impl<'a> GnucashPrices<'a> {
    /// Wrap quotes for export.
    pub const fn new(quotes: &'a [Quote]) -> Self {
        Self { quotes }
    }
}

impl Exporter for GnucashPrices<'_> {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(vec![]);
                for quote in self.quotes {
                    wtr.write_record([
                        quote.date.to_string(),
                        quote.namespace.clone(),
                        quote.symbol.clone(),
                        format!("{:.6}", quote.close),
                        quote.currency.clone(),
                    ])?;
                }
                into_string(wtr)
            }
            ExportFormat::Json => Ok(serde_json::to_string(self.quotes)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self.quotes)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn comparison() -> ComparisonExport {
        ComparisonExport {
            index_name: "TECH".to_string(),
            benchmark_name: "FFIV_comparison".to_string(),
            rows: vec![
                ComparisonRecord {
                    date: date(2),
                    index: Some(10000.0),
                    benchmark: None,
                },
                ComparisonRecord {
                    date: date(3),
                    index: Some(10100.5),
                    benchmark: Some(9950.0),
                },
            ],
        }
    }

    #[test]
    fn test_comparison_csv_leaves_absent_cells_empty() {
        let csv = comparison().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "date,TECH,FFIV_comparison");
        assert_eq!(lines[1], "2024-01-02,10000,");
        assert_eq!(lines[2], "2024-01-03,10100.5,9950");
    }

    #[test]
    fn test_comparison_json_uses_null() {
        let json = comparison().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("\"benchmark\":null"));
        let pretty = comparison().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains("  "));
    }

    #[test]
    fn test_comparison_file_name() {
        assert_eq!(
            comparison().file_name(ExportFormat::Csv),
            "TECH_vs_FFIV_comparison.csv"
        );
    }

    #[test]
    fn test_gnucash_csv() {
        let quotes = vec![
            Quote::new(date(2), "AAPL", 185.64),
            Quote::new(date(2), "BTC", 45000.5).with_namespace("CRYPTO"),
        ];
        let csv = GnucashPrices::new(&quotes)
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2024-01-02,NASDAQ,AAPL,185.640000,USD");
        assert_eq!(lines[1], "2024-01-02,CRYPTO,BTC,45000.500000,USD");
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(
            "pretty-json".parse::<ExportFormat>().unwrap(),
            ExportFormat::PrettyJson
        );
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_export_to_file_creates_directories() {
        let dir = std::env::temp_dir().join("basket_export_test");
        let path = dir.join("out").join("comparison.csv");
        comparison()
            .export_to_file(&path, ExportFormat::Csv)
            .unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("date,"));
        std::fs::remove_dir_all(dir).ok();
    }
}

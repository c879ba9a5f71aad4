//! Defaults and run configuration.

use crate::error::Result;
use basket_index::Benchmark;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Value every index portfolio is sized to.
pub const DEFAULT_PORTFOLIO_VALUE: f64 = 10_000.0;

/// Index definitions file.
pub const DEFAULT_INDEXES_FILE: &str = "./indexes.json";

/// Ticker configuration file.
pub const DEFAULT_TICKERS_FILE: &str = "./tickers.json";

/// Archive of raw API payloads.
pub const DEFAULT_ARCHIVE_FILE: &str = "./data/quotes.json";

/// GnuCash price import file.
pub const DEFAULT_GNUCASH_FILE: &str = "./data/prices.csv";

/// Directory comparison exports are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "./data";

/// Benchmark symbol indexes are compared against.
pub const DEFAULT_BENCHMARK_SYMBOL: &str = "FFIV";

/// Benchmark shares; zero sizes the holding to the portfolio value.
pub const DEFAULT_BENCHMARK_SHARES: f64 = 0.0;

/// Delay between API requests.
pub const DEFAULT_RATE_DELAY_SECS: u64 = 0;

/// Delay that keeps a free-tier API key under its quota.
pub const FREE_TIER_RATE_DELAY_SECS: u64 = 12;

/// Quotes on or before this date are discarded when parsing API payloads.
pub const EARLIEST_QUOTE_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2016, 1, 1) {
    Some(date) => date,
    None => NaiveDate::MIN,
};

/// Cache database under the platform cache directory, e.g. `~/.cache/basket/basket.db`.
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("basket")
        .join("basket.db")
}

/// Settings for one run. Every field falls back to the module defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Value every portfolio is sized to
    pub portfolio_value: f64,
    /// Index definitions file
    pub indexes_file: PathBuf,
    /// Ticker configuration file
    pub tickers_file: PathBuf,
    /// Raw payload archive
    pub archive_file: PathBuf,
    /// GnuCash price file
    pub gnucash_file: PathBuf,
    /// Comparison output directory
    pub output_dir: PathBuf,
    /// Cache database; the platform cache directory when unset
    pub cache_file: Option<PathBuf>,
    /// Benchmark holding
    pub benchmark: Benchmark,
    /// Seconds to wait after each API request
    pub rate_delay_secs: u64,
    /// Quotes on or before this date are discarded
    pub earliest_quote_date: Option<NaiveDate>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            portfolio_value: DEFAULT_PORTFOLIO_VALUE,
            indexes_file: PathBuf::from(DEFAULT_INDEXES_FILE),
            tickers_file: PathBuf::from(DEFAULT_TICKERS_FILE),
            archive_file: PathBuf::from(DEFAULT_ARCHIVE_FILE),
            gnucash_file: PathBuf::from(DEFAULT_GNUCASH_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            cache_file: None,
            benchmark: Benchmark::new(DEFAULT_BENCHMARK_SYMBOL, DEFAULT_BENCHMARK_SHARES),
            rate_delay_secs: DEFAULT_RATE_DELAY_SECS,
            earliest_quote_date: Some(EARLIEST_QUOTE_DATE),
        }
    }
}

impl RunConfig {
    /// Load a configuration file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded run configuration");
        Ok(config)
    }

    /// Reject values no run can use.
    pub fn validate(&self) -> Result<()> {
        if !self.portfolio_value.is_finite() || self.portfolio_value <= 0.0 {
            return Err(crate::RunError::Config(format!(
                "portfolio_value must be positive, got {}",
                self.portfolio_value
            )));
        }
        if self.benchmark.symbol.is_empty() {
            return Err(crate::RunError::Config(
                "benchmark symbol must not be empty".to_string(),
            ));
        }
        if !self.benchmark.shares.is_finite() || self.benchmark.shares < 0.0 {
            return Err(crate::RunError::Config(format!(
                "benchmark shares must be zero or positive, got {}",
                self.benchmark.shares
            )));
        }
        Ok(())
    }

    /// Delay between API requests.
    pub const fn rate_delay(&self) -> Duration {
        Duration::from_secs(self.rate_delay_secs)
    }

    /// Cache database location.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_file.clone().unwrap_or_else(default_cache_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.portfolio_value, 10_000.0);
        assert_eq!(config.benchmark.symbol, "FFIV");
        assert_eq!(config.benchmark.shares, 0.0);
        assert!(config.rate_delay().is_zero());
        assert_eq!(config.earliest_quote_date, NaiveDate::from_ymd_opt(2016, 1, 1));
        assert!(config.cache_path().ends_with("basket/basket.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: RunConfig = serde_json::from_str(
            r#"{"portfolio_value": 5000, "benchmark": {"symbol": "SPY", "shares": 10}, "rate_delay_secs": 12}"#,
        )
        .unwrap();
        assert_eq!(config.portfolio_value, 5000.0);
        assert_eq!(config.benchmark, Benchmark::new("SPY", 10.0));
        assert_eq!(config.rate_delay(), Duration::from_secs(FREE_TIER_RATE_DELAY_SECS));
        assert_eq!(config.indexes_file, PathBuf::from(DEFAULT_INDEXES_FILE));
    }

    #[test]
    fn test_invalid_portfolio_value() {
        let config = RunConfig {
            portfolio_value: -1.0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

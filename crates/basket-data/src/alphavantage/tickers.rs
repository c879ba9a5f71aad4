//! Ticker configuration: API key, URL templates and tickers per market.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// API access settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfiguration {
    /// Alpha Vantage API key
    pub key: String,
    /// URL template per market
    ///
    /// Templates use `{symbol}` and `{key}` placeholders. Positional `{}` placeholders
    /// are also accepted and are filled with the symbol, then the key.
    pub url_base: BTreeMap<String, String>,
}

/// Tickers to fetch, grouped by market (e.g. "stocks", "crypto").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerConfig {
    /// API access settings
    pub configuration: ApiConfiguration,
    /// Ticker symbols per market
    pub tickers: BTreeMap<String, Vec<String>>,
}

impl TickerConfig {
    /// Load and validate a ticker configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            markets = config.tickers.len(),
            symbols = config.symbol_count(),
            "loaded ticker configuration"
        );
        Ok(config)
    }

    /// Parse and validate a ticker configuration from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Every market with tickers must have a URL template and vice versa.
    pub fn validate(&self) -> Result<()> {
        let url_markets: Vec<&String> = self.configuration.url_base.keys().collect();
        let ticker_markets: Vec<&String> = self.tickers.keys().collect();
        if url_markets != ticker_markets {
            return Err(DataError::Config(format!(
                "url_base markets {:?} do not match ticker markets {:?}",
                url_markets, ticker_markets
            )));
        }
        Ok(())
    }

    /// Iterate `(market, tickers)` pairs in market order.
    pub fn markets(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tickers
            .iter()
            .map(|(market, symbols)| (market.as_str(), symbols.as_slice()))
    }

    /// Total number of tickers across markets.
    pub fn symbol_count(&self) -> usize {
        self.tickers.values().map(Vec::len).sum()
    }

    /// All tickers across markets, in market order.
    pub fn all_symbols(&self) -> Vec<String> {
        self.tickers.values().flatten().cloned().collect()
    }

    /// Build the request URL for a symbol in a market.
    pub fn url_for(&self, market: &str, symbol: &str) -> Result<String> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }
        let template = self
            .configuration
            .url_base
            .get(market)
            .ok_or_else(|| DataError::Config(format!("No url_base for market {}", market)))?;

        if template.contains("{symbol}") || template.contains("{key}") {
            return Ok(template
                .replace("{symbol}", symbol)
                .replace("{key}", &self.configuration.key));
        }

        Ok(template
            .replacen("{}", symbol, 1)
            .replacen("{}", &self.configuration.key, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "configuration": {
            "key": "DEMO",
            "url_base": {
                "stocks": "https://www.alphavantage.co/query?function=TIME_SERIES_DAILY&symbol={symbol}&apikey={key}",
                "crypto": "https://www.alphavantage.co/query?function=DIGITAL_CURRENCY_DAILY&symbol={}&market=USD&apikey={}"
            },
            "database": {"host": "localhost"}
        },
        "tickers": {
            "stocks": ["AAPL", "FFIV"],
            "crypto": ["BTC"]
        }
    }"#;

    #[test]
    fn test_parse_config() {
        let config = TickerConfig::from_json_str(CONFIG).unwrap();
        assert_eq!(config.symbol_count(), 3);
        assert_eq!(config.all_symbols(), vec!["BTC", "AAPL", "FFIV"]);
    }

    #[test]
    fn test_named_placeholders() {
        let config = TickerConfig::from_json_str(CONFIG).unwrap();
        let url = config.url_for("stocks", "AAPL").unwrap();
        assert!(url.contains("symbol=AAPL"));
        assert!(url.contains("apikey=DEMO"));
    }

    #[test]
    fn test_positional_placeholders() {
        let config = TickerConfig::from_json_str(CONFIG).unwrap();
        let url = config.url_for("crypto", "BTC").unwrap();
        assert!(url.contains("symbol=BTC&market=USD"));
        assert!(url.ends_with("apikey=DEMO"));
    }

    #[test]
    fn test_mismatched_markets() {
        let content = r#"{
            "configuration": {"key": "k", "url_base": {"stocks": "{symbol}"}},
            "tickers": {"stocks": ["AAPL"], "crypto": ["BTC"]}
        }"#;
        let result = TickerConfig::from_json_str(content);
        assert!(matches!(result, Err(DataError::Config(_))));
    }

    #[test]
    fn test_unknown_market() {
        let config = TickerConfig::from_json_str(CONFIG).unwrap();
        assert!(matches!(
            config.url_for("bonds", "TLT"),
            Err(DataError::Config(_))
        ));
        assert!(matches!(
            config.url_for("stocks", ""),
            Err(DataError::InvalidSymbol(_))
        ));
    }
}

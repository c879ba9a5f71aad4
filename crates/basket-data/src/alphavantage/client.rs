//! Alpha Vantage HTTP client with a fixed delay between requests.

use super::tickers::TickerConfig;
use crate::error::{DataError, Result};
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;

const USER_AGENT: &str = "basket/0.1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A payload fetched for one ticker.
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    /// Market the ticker belongs to
    pub market: String,
    /// Requested ticker
    pub symbol: String,
    /// Raw JSON response
    pub payload: Value,
}

/// Sequential Alpha Vantage client.
///
/// Requests are issued one at a time and followed by `rate_delay`, which keeps the
/// client under the free-tier quota when set to ~12 seconds.
#[derive(Debug)]
pub struct AlphaVantageClient {
    client: reqwest::Client,
    rate_delay: Duration,
}

impl AlphaVantageClient {
    /// Create a client with no delay between requests.
    pub fn new() -> Result<Self> {
        Self::with_rate_delay(Duration::ZERO)
    }

    /// Create a client that sleeps `rate_delay` after every request.
    pub fn with_rate_delay(rate_delay: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self { client, rate_delay })
    }

    /// Delay applied after each request.
    pub const fn rate_delay(&self) -> Duration {
        self.rate_delay
    }

    /// Fetch the raw JSON for one ticker.
    pub async fn fetch_symbol(
        &self,
        config: &TickerConfig,
        market: &str,
        symbol: &str,
    ) -> Result<Value> {
        let url = config.url_for(market, symbol)?;
        tracing::debug!(%market, %symbol, "requesting quotes");

        let result = self.get_json(&url).await;

        if !self.rate_delay.is_zero() {
            tracing::debug!(delay = ?self.rate_delay, "waiting before next request");
            sleep(self.rate_delay).await;
        }

        result
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(DataError::Http(format!("HTTP {}", response.status())));
        }

        Ok(response.json::<Value>().await?)
    }

    /// Fetch every ticker of every market in order.
    ///
    /// A failed ticker is logged and skipped; it is not retried.
    pub async fn fetch_all(&self, config: &TickerConfig) -> Vec<FetchedPayload> {
        self.fetch_all_with(config, |_, _, _| {}).await
    }

    /// Like [`fetch_all`](Self::fetch_all), calling `on_ticker(market, symbol, error)`
    /// after each request. `error` is `None` when the ticker was fetched.
    pub async fn fetch_all_with<F>(&self, config: &TickerConfig, mut on_ticker: F) -> Vec<FetchedPayload>
    where
        F: FnMut(&str, &str, Option<&DataError>),
    {
        let mut results = Vec::with_capacity(config.symbol_count());

        for (market, symbols) in config.markets() {
            for symbol in symbols {
                tracing::info!(%market, %symbol, "fetching ticker");
                match self.fetch_symbol(config, market, symbol).await {
                    Ok(payload) => {
                        on_ticker(market, symbol, None);
                        results.push(FetchedPayload {
                            market: market.to_string(),
                            symbol: symbol.clone(),
                            payload,
                        });
                    }
                    Err(e) => {
                        tracing::warn!(%market, %symbol, error = %e, "failed to fetch ticker");
                        on_ticker(market, symbol, Some(&e));
                    }
                }
            }
        }

        results
    }
}

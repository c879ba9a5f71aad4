//! Alpha Vantage quote source.

pub mod client;
pub mod response;
pub mod tickers;

pub use client::{AlphaVantageClient, FetchedPayload};
pub use response::{AssetClass, ParsedSeries, ResponseParser};
pub use tickers::{ApiConfiguration, TickerConfig};

//! Ticker download with a progress bar.

use basket_data::alphavantage::{AlphaVantageClient, FetchedPayload, TickerConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Outcome of one download pass.
#[derive(Debug, Default)]
pub(crate) struct FetchReport {
    pub(crate) payloads: Vec<FetchedPayload>,
    pub(crate) failed: Vec<String>,
}

fn progress_bar(len: usize) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

/// Fetch every configured ticker, one request at a time.
///
/// Failed tickers are reported and skipped.
pub(crate) async fn fetch_tickers(
    client: &AlphaVantageClient,
    config: &TickerConfig,
) -> Result<FetchReport, Box<dyn std::error::Error>> {
    let pb = progress_bar(config.symbol_count())?;
    let mut failed = Vec::new();

    let payloads = client
        .fetch_all_with(config, |market, symbol, error| {
            pb.set_message(format!("{}/{}", market, symbol));
            if error.is_some() {
                failed.push(symbol.to_string());
            }
            pb.inc(1);
        })
        .await;

    pb.finish_with_message(format!(
        "Fetched {} tickers ({} failed)",
        payloads.len(),
        failed.len()
    ));
    Ok(FetchReport { payloads, failed })
}

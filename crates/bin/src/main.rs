//! Basket CLI binary.
//!
//! Downloads daily quotes, builds synthetic indexes from them and compares each index
//! against a benchmark ticker.

mod integration;

use basket::{IndexRun, RunConfig};
use basket_data::alphavantage::{AlphaVantageClient, ResponseParser, TickerConfig};
use basket_data::archive::{load_responses, save_responses};
use basket_data::cache::{QuoteFilter, SqliteCache};
use basket_index::{Benchmark, IndexDefinitionSet, PriceTable, correlation};
use basket_output::{
    ComparisonExport, ComparisonSummary, ExportFormat, Exporter, GnucashPrices,
    PortfolioExport, index_tree, portfolio_table, price_statistics_table, ticker_tree,
};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use integration::cache_manager::{cache_path, open_cache};
use integration::fetch::fetch_tickers;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "basket")]
#[command(about = "Basket: synthetic market indexes built from daily quotes", long_about = None)]
#[command(version)]
struct Cli {
    /// Run configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache database, overriding the configuration
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download quotes for every configured ticker into the archive and the cache
    Fetch {
        /// Ticker configuration file
        #[arg(long)]
        tickers: Option<PathBuf>,

        /// Seconds to wait after each request
        #[arg(long, conflicts_with = "free_tier")]
        rate_delay: Option<u64>,

        /// Wait long enough between requests to stay inside the free API quota
        #[arg(long)]
        free_tier: bool,
    },

    /// Parse the payload archive into the cache without touching the network
    Load {
        /// Payload archive, overriding the configuration
        #[arg(long)]
        archive: Option<PathBuf>,
    },

    /// Show configured tickers per market
    Tickers {
        /// Ticker configuration file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show index definitions and their members
    Indexes {
        /// Index definitions file
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show the holdings of one index
    Portfolio {
        /// Index name
        name: String,

        /// Also write the holdings to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },

    /// Compare indexes against the benchmark and write one file per index
    Compare {
        /// Only compare this index
        #[arg(long)]
        index: Option<String>,

        /// Benchmark ticker, overriding the configuration
        #[arg(long)]
        benchmark: Option<String>,

        /// Benchmark shares; zero sizes the benchmark to the portfolio value
        #[arg(long, allow_negative_numbers = true)]
        shares: Option<f64>,

        /// First date of the comparison (default: index start date)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last date of the comparison (default: last priced date)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Output format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: ExportFormat,

        /// Output directory, overriding the configuration
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Write every cached quote as a GnuCash price import file
    Gnucash {
        /// Output file, overriding the configuration
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Per-symbol price statistics
    Stats {
        /// Only these symbols
        symbols: Vec<String>,
    },

    /// Correlation of two symbols' closes
    Correlate {
        /// First symbol
        first: String,

        /// Second symbol
        second: String,

        /// Ignore dates before this one
        #[arg(long)]
        since: Option<NaiveDate>,
    },

    /// Inspect or clear the quote cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show cache location and contents
    Info,

    /// Remove cached quotes
    Clear {
        /// Only remove this symbol
        #[arg(long)]
        symbol: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let cache_file = cache_path(cli.cache.as_deref(), &config);

    match cli.command {
        Commands::Fetch {
            tickers,
            rate_delay,
            free_tier,
        } => {
            let delay = if free_tier {
                Duration::from_secs(basket::config::FREE_TIER_RATE_DELAY_SECS)
            } else {
                rate_delay.map_or_else(|| config.rate_delay(), Duration::from_secs)
            };
            let tickers = tickers.unwrap_or_else(|| config.tickers_file.clone());
            fetch(&config, &tickers, delay, &cache_file).await?;
        }
        Commands::Load { archive } => {
            let archive = archive.unwrap_or_else(|| config.archive_file.clone());
            let payloads = load_responses(&archive)?;
            let cache = open_cache(&cache_file)?;
            let stored = store_payloads(&config, &payloads, &cache)?;
            println!(
                "Loaded {} quotes from {} into {}",
                stored,
                archive.display(),
                cache_file.display()
            );
        }
        Commands::Tickers { file } => {
            let tickers = TickerConfig::load(file.unwrap_or_else(|| config.tickers_file.clone()))?;
            print!("{}", ticker_tree(&tickers));
        }
        Commands::Indexes { file } => {
            let definitions = load_definitions(file.as_deref().unwrap_or(config.indexes_file.as_path()))?;
            print!("{}", index_tree(&definitions));
        }
        Commands::Portfolio {
            name,
            output,
            format,
        } => {
            let run = open_run(&config, &cache_file)?;
            let portfolio = run
                .portfolio(&name)
                .ok_or_else(|| format!("no portfolio for index {}", name))?;
            print!("{}", portfolio_table(portfolio));

            if let Some(path) = output {
                PortfolioExport::from_portfolio(portfolio).export_to_file(&path, format)?;
                println!("\nHoldings written to {}", path.display());
            }
        }
        Commands::Compare {
            index,
            benchmark,
            shares,
            start,
            end,
            format,
            output_dir,
        } => {
            let benchmark = benchmark_override(&config, benchmark, shares)?;
            let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());
            let run = open_run(&config, &cache_file)?;
            compare(&run, index.as_deref(), &benchmark, (start, end), format, &output_dir)?;
        }
        Commands::Gnucash { output } => {
            let output = output.unwrap_or_else(|| config.gnucash_file.clone());
            let cache = open_cache(&cache_file)?;
            let quotes = cache.get_quotes(&QuoteFilter::all())?;
            GnucashPrices::new(&quotes).export_to_file(&output, ExportFormat::Csv)?;
            println!("Wrote {} prices to {}", quotes.len(), output.display());
        }
        Commands::Stats { symbols } => {
            let prices = load_prices(&cache_file, symbols)?;
            print!("{}", price_statistics_table(&prices.describe()));
        }
        Commands::Correlate {
            first,
            second,
            since,
        } => {
            let prices = load_prices(&cache_file, vec![first.clone(), second.clone()])?;
            let result = correlation(&prices, &first, &second, since)?;
            println!(
                "{} / {}: {:.4} over {} dates ({} to {})",
                result.first,
                result.second,
                result.coefficient,
                result.observations,
                result.start,
                result.end
            );
        }
        Commands::Cache { action } => {
            let cache = open_cache(&cache_file)?;
            match action {
                CacheAction::Info => print_cache_info(&cache_file, &cache)?,
                CacheAction::Clear { symbol: Some(symbol) } => {
                    let removed = cache.clear_symbol(&symbol)?;
                    println!("Removed {} quotes for {}", removed, symbol);
                }
                CacheAction::Clear { symbol: None } => {
                    cache.clear_all()?;
                    println!("Cleared {}", cache_file.display());
                }
            }
        }
    }

    Ok(())
}

async fn fetch(
    config: &RunConfig,
    tickers: &Path,
    delay: Duration,
    cache_file: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let tickers = TickerConfig::load(tickers)?;
    let client = AlphaVantageClient::with_rate_delay(delay)?;

    println!(
        "Fetching {} tickers across {} markets",
        tickers.symbol_count(),
        tickers.tickers.len()
    );
    if !delay.is_zero() {
        println!("  Waiting {}s after each request", delay.as_secs());
    }

    let report = fetch_tickers(&client, &tickers).await?;
    if !report.failed.is_empty() {
        println!("  Failed: {}", report.failed.join(", "));
    }

    let payloads: Vec<Value> = report.payloads.into_iter().map(|p| p.payload).collect();
    save_responses(&config.archive_file, &payloads)?;
    println!("  Archived responses to {}", config.archive_file.display());

    let cache = open_cache(cache_file)?;
    let stored = store_payloads(config, &payloads, &cache)?;
    println!("  Cached {} quotes in {}", stored, cache_file.display());

    Ok(())
}

fn store_payloads(
    config: &RunConfig,
    payloads: &[Value],
    cache: &SqliteCache,
) -> Result<usize, Box<dyn std::error::Error>> {
    let parser = config
        .earliest_quote_date
        .map_or_else(ResponseParser::new, |date| {
            ResponseParser::new().with_earliest(date)
        });
    let quotes: Vec<_> = parser
        .parse_all(payloads)
        .into_iter()
        .flat_map(|series| series.quotes)
        .collect();
    Ok(cache.put_quotes(&quotes)?)
}

fn load_definitions(path: &Path) -> Result<IndexDefinitionSet, Box<dyn std::error::Error>> {
    let definitions = IndexDefinitionSet::load(path)?;
    for rejected in definitions.rejected() {
        eprintln!(
            "Skipping index #{} ({}): {}",
            rejected.position,
            rejected.name.as_deref().unwrap_or("unnamed"),
            rejected.error
        );
    }
    Ok(definitions)
}

fn load_prices(
    cache_file: &Path,
    symbols: Vec<String>,
) -> Result<PriceTable, Box<dyn std::error::Error>> {
    let cache = open_cache(cache_file)?;
    let filter = if symbols.is_empty() {
        QuoteFilter::all()
    } else {
        QuoteFilter::all().symbols(symbols)
    };
    let quotes = cache.get_quotes(&filter)?;
    if quotes.is_empty() {
        return Err(format!("no cached quotes in {}", cache_file.display()).into());
    }
    Ok(PriceTable::build(&quotes))
}

fn open_run(config: &RunConfig, cache_file: &Path) -> Result<IndexRun, Box<dyn std::error::Error>> {
    let definitions = load_definitions(&config.indexes_file)?;
    let cache = open_cache(cache_file)?;
    let run = IndexRun::from_cache(config, &cache, definitions)?;

    if !run.missing_symbols().is_empty() {
        eprintln!("No prices for: {}", run.missing_symbols().join(", "));
    }
    for failure in run.failures() {
        eprintln!("Skipping index {}: {}", failure.index, failure.error);
    }
    Ok(run)
}

/// Benchmark from the configuration with command-line overrides applied, checked
/// by the same rules as a loaded configuration.
fn benchmark_override(
    config: &RunConfig,
    symbol: Option<String>,
    shares: Option<f64>,
) -> basket::Result<Benchmark> {
    let mut overridden = config.clone();
    if let Some(symbol) = symbol {
        overridden.benchmark.symbol = symbol;
    }
    if let Some(shares) = shares {
        overridden.benchmark.shares = shares;
    }
    overridden.validate()?;
    Ok(overridden.benchmark)
}

/// Write one comparison per index. An index that cannot be compared is skipped; the
/// call fails only when nothing was written. Returns the number of files written.
fn compare(
    run: &IndexRun,
    only: Option<&str>,
    benchmark: &Benchmark,
    (start, end): (Option<NaiveDate>, Option<NaiveDate>),
    format: ExportFormat,
    output_dir: &Path,
) -> Result<usize, Box<dyn std::error::Error>> {
    let names: Vec<String> = match only {
        Some(name) => vec![name.to_string()],
        None => run
            .portfolios()
            .iter()
            .map(|p| p.name().to_string())
            .collect(),
    };
    if names.is_empty() {
        return Err("no index could be built from the cached prices".into());
    }

    let mut written = 0;
    let mut last_error = None;
    for name in names {
        let series = match run.compare(&name, benchmark, start, end) {
            Ok(series) => series,
            Err(error) => {
                tracing::warn!(index = %name, %error, "failed to compare index");
                eprintln!("Skipping index {}: {}", name, error);
                last_error = Some(error);
                continue;
            }
        };
        let export = ComparisonExport::from_series(&series);
        let path = output_dir.join(export.file_name(format));
        export.export_to_file(&path, format)?;
        written += 1;

        println!("{}", ComparisonSummary::from_series(&series));
        println!("Written to {}\n", path.display());
    }

    match last_error {
        Some(error) if written == 0 => Err(error.into()),
        _ => Ok(written),
    }
}

fn print_cache_info(path: &Path, cache: &SqliteCache) -> Result<(), Box<dyn std::error::Error>> {
    let stats = cache.stats()?;

    println!("Cache: {}", path.display());
    println!("{}", "=".repeat(48));
    println!("{:<24} {}", "Quotes:", stats.total_quotes);
    println!("{:<24} {}", "Symbols:", stats.unique_symbols);
    match (stats.first_date, stats.last_date) {
        (Some(first), Some(last)) => println!("{:<24} {} to {}", "Dates:", first, last),
        _ => println!("{:<24} empty", "Dates:"),
    }
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            println!("{:<24} ~/{}", "Location:", rest.display());
        }
    }
    Ok(())
}

//! One analysis run: a price table, index definitions and the portfolios built from them.

use crate::config::RunConfig;
use crate::error::Result;
use basket_data::cache::{QuoteFilter, SqliteCache};
use basket_index::{
    Benchmark, ComparisonSeries, IndexDefinitionSet, IndexError, IndexSeries, IndexValuator,
    Portfolio, PortfolioBuilder, PriceTable, compare,
};
use chrono::NaiveDate;

/// An index whose portfolio could not be built.
#[derive(Debug)]
pub struct IndexFailure {
    /// Index name
    pub index: String,
    /// Why the build failed
    pub error: IndexError,
}

/// Portfolios for every index definition, valued against one price table.
///
/// Portfolios are built once in [`IndexRun::new`]. A failing index is recorded in
/// [`failures`](Self::failures) and does not stop the others.
#[derive(Debug)]
pub struct IndexRun {
    prices: PriceTable,
    definitions: IndexDefinitionSet,
    portfolios: Vec<Portfolio>,
    failures: Vec<IndexFailure>,
    missing_symbols: Vec<String>,
    valuator: IndexValuator,
}

impl IndexRun {
    /// Build every portfolio in `definitions` against `prices`.
    pub fn new(config: &RunConfig, prices: PriceTable, definitions: IndexDefinitionSet) -> Self {
        let missing_symbols = prices.select(&definitions.all_symbols()).missing;
        let prices = prices.drop_empty_columns();

        let builder = PortfolioBuilder::new(config.portfolio_value);
        let mut portfolios = Vec::with_capacity(definitions.len());
        let mut failures = Vec::new();

        for definition in &definitions {
            match builder.build(definition, &prices) {
                Ok(portfolio) => portfolios.push(portfolio),
                Err(error) => {
                    tracing::warn!(index = %definition.name(), %error, "failed to build portfolio");
                    failures.push(IndexFailure {
                        index: definition.name().to_string(),
                        error,
                    });
                }
            }
        }

        tracing::info!(
            dates = prices.len(),
            portfolios = portfolios.len(),
            failures = failures.len(),
            "index run ready"
        );

        Self {
            prices,
            definitions,
            portfolios,
            failures,
            missing_symbols,
            valuator: IndexValuator::new(config.portfolio_value),
        }
    }

    /// Build a run from every quote in the cache.
    pub fn from_cache(
        config: &RunConfig,
        cache: &SqliteCache,
        definitions: IndexDefinitionSet,
    ) -> Result<Self> {
        let quotes = cache.get_quotes(&QuoteFilter::all())?;
        tracing::info!(quotes = quotes.len(), "read quotes from cache");
        Ok(Self::new(config, PriceTable::build(&quotes), definitions))
    }

    /// The price table the run values against.
    pub const fn prices(&self) -> &PriceTable {
        &self.prices
    }

    /// Index definitions of the run.
    pub const fn definitions(&self) -> &IndexDefinitionSet {
        &self.definitions
    }

    /// Successfully built portfolios in definition order.
    pub fn portfolios(&self) -> &[Portfolio] {
        &self.portfolios
    }

    /// Portfolio of the index named `name`.
    pub fn portfolio(&self, name: &str) -> Option<&Portfolio> {
        self.portfolios.iter().find(|p| p.name() == name)
    }

    /// Indexes whose portfolio could not be built.
    pub fn failures(&self) -> &[IndexFailure] {
        &self.failures
    }

    /// Index members with no price anywhere in the table.
    pub fn missing_symbols(&self) -> &[String] {
        &self.missing_symbols
    }

    fn require(&self, name: &str) -> basket_index::Result<&Portfolio> {
        if let Some(portfolio) = self.portfolio(name) {
            return Ok(portfolio);
        }
        let reason = self
            .failures
            .iter()
            .find(|f| f.index == name)
            .map_or_else(
                || name.to_string(),
                |f| format!("{} (portfolio failed: {})", name, f.error),
            );
        Err(IndexError::UnknownIndex(reason))
    }

    /// Daily value series of the index named `name`.
    pub fn series(&self, name: &str) -> basket_index::Result<IndexSeries> {
        let portfolio = self.require(name)?;
        Ok(self.valuator.value_series(portfolio, &self.prices))
    }

    /// Value of the index named `name` on `date`; every member must be priced.
    pub fn value_at(&self, name: &str, date: NaiveDate) -> basket_index::Result<f64> {
        let portfolio = self.require(name)?;
        self.valuator.value_at(portfolio, &self.prices, date)
    }

    /// Compare the index named `name` against `benchmark`.
    ///
    /// `start` defaults to the index start date and `end` to the last date of the price
    /// table. A zero-share benchmark is sized at the index start date.
    pub fn compare(
        &self,
        name: &str,
        benchmark: &Benchmark,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> basket_index::Result<ComparisonSeries> {
        let portfolio = self.require(name)?;
        let start = start.unwrap_or_else(|| portfolio.start_date());
        let end = end
            .or_else(|| self.prices.last_date())
            .ok_or(IndexError::EmptyPriceTable)?;

        let index = self.valuator.value_series(portfolio, &self.prices);
        let benchmark =
            self.valuator
                .benchmark_series(benchmark, portfolio.start_date(), &self.prices)?;

        compare(&index, &benchmark, start, end)
    }
}

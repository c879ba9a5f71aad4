//! Fixed holdings for an index, sized at its start date.

use crate::definition::{IndexDefinition, Weighting};
use crate::error::{IndexError, Result};
use crate::price_table::PriceTable;
use chrono::NaiveDate;

/// Shares held in one member.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    /// Member symbol
    pub symbol: String,
    /// Number of shares
    pub shares: f64,
    /// Close at the start date
    pub start_price: f64,
}

impl Holding {
    /// Dollar value at the start date.
    pub fn start_value(&self) -> f64 {
        self.shares * self.start_price
    }
}

/// Holdings of one index. Never rebalanced.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    name: String,
    start_date: NaiveDate,
    target_value: f64,
    holdings: Vec<Holding>,
}

impl Portfolio {
    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Date the holdings were sized at.
    pub const fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Portfolio value the holdings were sized to.
    pub const fn target_value(&self) -> f64 {
        self.target_value
    }

    /// Holdings in member order.
    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Shares held in `symbol`.
    pub fn shares(&self, symbol: &str) -> Option<f64> {
        self.holdings
            .iter()
            .find(|h| h.symbol == symbol)
            .map(|h| h.shares)
    }

    /// Value of the holdings at their start prices.
    pub fn start_value(&self) -> f64 {
        self.holdings.iter().map(Holding::start_value).sum()
    }

    /// Fraction of the start value held in each member.
    pub fn weights(&self) -> Vec<(String, f64)> {
        let total = self.start_value();
        self.holdings
            .iter()
            .map(|h| (h.symbol.clone(), h.start_value() / total))
            .collect()
    }
}

/// Sizes portfolios to a target value.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioBuilder {
    portfolio_value: f64,
}

impl PortfolioBuilder {
    /// Builder targeting `portfolio_value` per index.
    pub const fn new(portfolio_value: f64) -> Self {
        Self { portfolio_value }
    }

    /// Target value per index.
    pub const fn portfolio_value(&self) -> f64 {
        self.portfolio_value
    }

    /// The configured start date, or the first date of `prices`.
    pub fn resolve_start_date(
        definition: &IndexDefinition,
        prices: &PriceTable,
    ) -> Result<NaiveDate> {
        definition
            .start_date()
            .or_else(|| prices.first_date())
            .ok_or(IndexError::EmptyPriceTable)
    }

    /// Size `definition` against the closes at its resolved start date.
    pub fn build(&self, definition: &IndexDefinition, prices: &PriceTable) -> Result<Portfolio> {
        let start_date = Self::resolve_start_date(definition, prices)?;

        let start_prices = definition
            .members()
            .iter()
            .map(|symbol| start_price(prices, symbol, start_date))
            .collect::<Result<Vec<f64>>>()?;

        let value = self.portfolio_value;
        let shares: Vec<f64> = match definition.weighting() {
            Weighting::EqualWeight => {
                let n = start_prices.len() as f64;
                start_prices.iter().map(|p| value / (n * p)).collect()
            }
            Weighting::Constant => {
                let total: f64 = start_prices.iter().sum();
                vec![value / total; start_prices.len()]
            }
            Weighting::MarketCap { market_caps } => {
                let total_cap: f64 = market_caps.iter().sum();
                market_caps
                    .iter()
                    .zip(&start_prices)
                    .map(|(cap, p)| value * cap / (p * total_cap))
                    .collect()
            }
        };

        let holdings = definition
            .members()
            .iter()
            .zip(shares)
            .zip(start_prices)
            .map(|((symbol, shares), start_price)| Holding {
                symbol: symbol.clone(),
                shares,
                start_price,
            })
            .collect();

        let portfolio = Portfolio {
            name: definition.name().to_string(),
            start_date,
            target_value: value,
            holdings,
        };

        tracing::info!(
            index = %portfolio.name,
            weighting = %definition.weighting().kind(),
            %start_date,
            members = portfolio.holdings.len(),
            "initialized portfolio"
        );

        Ok(portfolio)
    }
}

fn start_price(prices: &PriceTable, symbol: &str, date: NaiveDate) -> Result<f64> {
    let price = prices
        .get(symbol, date)
        .ok_or_else(|| IndexError::MissingStartPrice {
            symbol: symbol.to_string(),
            date,
        })?;
    if price <= 0.0 {
        return Err(IndexError::InvalidStartPrice {
            symbol: symbol.to_string(),
            date,
            price,
        });
    }
    Ok(price)
}

//! Plain-text listings: trees of tickers and indexes, ASCII tables.

use basket_data::alphavantage::TickerConfig;
use basket_index::{IndexDefinitionSet, Portfolio, SymbolStatistics, Weighting};

/// Render a two-level tree.
///
/// ```text
/// Tickers:
/// ├── crypto
/// │   └── BTC
/// └── stocks
///     ├── AAPL
///     └── FFIV
/// ```
pub fn render_tree(title: &str, branches: &[(String, Vec<String>)]) -> String {
    let mut output = format!("{}:\n", title);

    for (i, (branch, leaves)) in branches.iter().enumerate() {
        let last_branch = i + 1 == branches.len();
        output.push_str(if last_branch { "└── " } else { "├── " });
        output.push_str(branch);
        output.push('\n');

        let indent = if last_branch { "    " } else { "│   " };
        for (j, leaf) in leaves.iter().enumerate() {
            let last_leaf = j + 1 == leaves.len();
            output.push_str(indent);
            output.push_str(if last_leaf { "└── " } else { "├── " });
            output.push_str(leaf);
            output.push('\n');
        }
    }

    output
}

/// Tickers grouped by market.
pub fn ticker_tree(config: &TickerConfig) -> String {
    let branches: Vec<(String, Vec<String>)> = config
        .markets()
        .map(|(market, symbols)| (market.to_string(), symbols.to_vec()))
        .collect();
    render_tree("Tickers", &branches)
}

/// Index definitions with their weighting scheme and members.
pub fn index_tree(definitions: &IndexDefinitionSet) -> String {
    let branches: Vec<(String, Vec<String>)> = definitions
        .iter()
        .map(|d| {
            let mut label = format!("{} ({})", d.name(), d.weighting().kind());
            if let Some(date) = d.start_date() {
                label.push_str(&format!(" since {}", date));
            }
            let leaves = match d.weighting() {
                Weighting::MarketCap { market_caps } => d
                    .members()
                    .iter()
                    .zip(market_caps)
                    .map(|(m, cap)| format!("{} [cap {}]", m, cap))
                    .collect(),
                _ => d.members().to_vec(),
            };
            (label, leaves)
        })
        .collect();
    render_tree("Indexes", &branches)
}

/// Holdings table for one portfolio.
pub fn portfolio_table(portfolio: &Portfolio) -> String {
    let mut output = String::new();

    output.push_str(&format!("\nIndex: {}\n", portfolio.name()));
    output.push_str(&format!("Start Date: {}\n", portfolio.start_date()));
    output.push_str(&"=".repeat(64));
    output.push('\n');
    output.push_str(&format!(
        "{:<10} {:>14} {:>12} {:>14} {:>9}\n",
        "Symbol", "Shares", "Price", "Value", "Weight"
    ));
    output.push_str(&"-".repeat(64));
    output.push('\n');

    for (holding, (_, weight)) in portfolio.holdings().iter().zip(portfolio.weights()) {
        output.push_str(&format!(
            "{:<10} {:>14.6} {:>12.4} {:>14.2} {:>8.2}%\n",
            holding.symbol,
            holding.shares,
            holding.start_price,
            holding.start_value(),
            weight * 100.0
        ));
    }

    output.push_str(&"-".repeat(64));
    output.push('\n');
    output.push_str(&format!(
        "{:<10} {:>14} {:>12} {:>14.2}\n",
        "Total",
        "",
        "",
        portfolio.start_value()
    ));

    output
}

/// Per-symbol price statistics table.
pub fn price_statistics_table(stats: &[SymbolStatistics]) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<10} {:>6} {:>12} {:>12} {:>12} {:>12} {:>11} {:>11}\n",
        "Symbol", "Count", "Mean", "Std", "Min", "Max", "First", "Last"
    ));
    output.push_str(&"-".repeat(94));
    output.push('\n');

    for s in stats {
        output.push_str(&format!(
            "{:<10} {:>6} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>11} {:>11}\n",
            s.symbol, s.count, s.mean, s.std_dev, s.min, s.max, s.first_date, s.last_date
        ));
    }

    output
}

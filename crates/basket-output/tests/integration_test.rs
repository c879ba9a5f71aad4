//! Integration tests for exporting index comparisons and holdings.

use approx::assert_relative_eq;
use basket_data::Quote;
use basket_index::{
    Benchmark, IndexDefinition, IndexValuator, PortfolioBuilder, PriceTable, compare,
};
use basket_output::{
    ComparisonExport, ComparisonSummary, ExportFormat, Exporter, PortfolioExport,
    portfolio_table, price_statistics_table,
};
use chrono::NaiveDate;

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn prices() -> PriceTable {
    let mut quotes = Vec::new();
    for (day, aaa, bbb, ffiv) in [
        (2, 10.0, 20.0, 100.0),
        (3, 11.0, 21.0, 101.0),
        (4, 12.0, 19.0, 99.0),
        (5, 12.5, 22.0, 104.0),
    ] {
        quotes.push(Quote::new(date(day), "AAA", aaa));
        quotes.push(Quote::new(date(day), "BBB", bbb));
        quotes.push(Quote::new(date(day), "FFIV", ffiv));
    }
    PriceTable::build(&quotes)
}

#[test]
fn test_full_comparison_workflow() {
    let prices = prices();
    let definition = IndexDefinition::market_cap("TECH", ["AAA", "BBB"], vec![1.0, 3.0]).unwrap();
    let portfolio = PortfolioBuilder::new(10_000.0)
        .build(&definition, &prices)
        .unwrap();

    let valuator = IndexValuator::new(10_000.0);
    let index = valuator.value_series(&portfolio, &prices);
    let benchmark = valuator
        .benchmark_series(&Benchmark::auto_sized("FFIV"), portfolio.start_date(), &prices)
        .unwrap();
    let comparison = compare(&index, &benchmark, date(2), date(5)).unwrap();

    let export = ComparisonExport::from_series(&comparison);
    let csv = export.export_to_string(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "date,TECH,FFIV_comparison");
    assert!(lines[1].starts_with("2024-01-02,10000"));

    let summary = ComparisonSummary::from_series(&comparison);
    assert_eq!(summary.partial_rows, 0);
    assert_relative_eq!(summary.benchmark_return.unwrap(), 0.04, epsilon = 1e-12);

    // 250 AAA shares, 375 BBB shares
    let expected_end = 250.0 * 12.5 + 375.0 * 22.0;
    assert_relative_eq!(
        summary.index_return.unwrap(),
        expected_end / 10_000.0 - 1.0,
        epsilon = 1e-12
    );
}

#[test]
fn test_portfolio_export_and_table() {
    let prices = prices();
    let definition = IndexDefinition::equal_weight("EQ", ["AAA", "BBB", "FFIV"]).unwrap();
    let portfolio = PortfolioBuilder::new(9_000.0)
        .build(&definition, &prices)
        .unwrap();

    let export = PortfolioExport::from_portfolio(&portfolio);
    assert_eq!(export.holdings.len(), 3);
    assert_relative_eq!(export.total_weight(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(export.holdings[0].start_value, 3_000.0, epsilon = 1e-9);

    let csv = export.export_to_string(ExportFormat::Csv).unwrap();
    assert!(csv.starts_with("# Index: EQ\n"));
    assert!(csv.contains("symbol,shares,start_price,start_value,weight"));

    let json = export.export_to_string(ExportFormat::Json).unwrap();
    let back: PortfolioExport = serde_json::from_str(&json).unwrap();
    assert_eq!(back.name, "EQ");

    let table = portfolio_table(&portfolio);
    assert!(table.contains("Index: EQ"));
    assert!(table.contains("FFIV"));
}

#[test]
fn test_price_statistics_table() {
    let table = price_statistics_table(&prices().describe());
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[2].starts_with("AAA"));
    assert!(lines[4].contains("2024-01-05"));
}

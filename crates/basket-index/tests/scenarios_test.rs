//! End-to-end index construction scenarios

use approx::assert_relative_eq;
use basket_data::Quote;
use basket_index::{
    Benchmark, IndexDefinition, IndexDefinitionSet, IndexError, IndexValuator, PortfolioBuilder,
    PriceTable, WeightingKind, compare,
};
use chrono::NaiveDate;
use rstest::rstest;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn two_member_table() -> PriceTable {
    PriceTable::build(&[
        Quote::new(date(2024, 1, 2), "AAA", 10.0),
        Quote::new(date(2024, 1, 2), "BBB", 20.0),
    ])
}

fn definition(kind: WeightingKind, members: &[&str]) -> IndexDefinition {
    let definition = match kind {
        WeightingKind::EqualWeight => IndexDefinition::equal_weight("IDX", members.iter().copied()),
        WeightingKind::Constant => IndexDefinition::constant("IDX", members.iter().copied()),
        WeightingKind::MarketCap => IndexDefinition::market_cap(
            "IDX",
            members.iter().copied(),
            (1..=members.len()).map(|i| 100.0 * i as f64).collect(),
        ),
    };
    definition.unwrap()
}

/// A table where five members trade on a handful of days with irregular prices.
fn wide_table() -> PriceTable {
    let rows = [
        (2, [12.5, 301.2, 7.75, 48.0, 1999.0]),
        (3, [12.9, 299.0, 7.80, 47.1, 2010.5]),
        (4, [13.1, 305.4, 7.60, 49.9, 1987.2]),
    ];
    let symbols = ["AAA", "BBB", "CCC", "DDD", "EEE"];
    let quotes: Vec<Quote> = rows
        .iter()
        .flat_map(|(day, closes)| {
            symbols
                .iter()
                .zip(closes)
                .map(move |(symbol, close)| Quote::new(date(2024, 1, *day), *symbol, *close))
        })
        .collect();
    PriceTable::build(&quotes)
}

#[test]
fn test_scenario_a_equal_weight() {
    let prices = two_member_table();
    let portfolio = PortfolioBuilder::new(1000.0)
        .build(&definition(WeightingKind::EqualWeight, &["AAA", "BBB"]), &prices)
        .unwrap();

    assert_relative_eq!(portfolio.shares("AAA").unwrap(), 50.0);
    assert_relative_eq!(portfolio.shares("BBB").unwrap(), 25.0);

    let value = IndexValuator::new(1000.0)
        .value_at(&portfolio, &prices, date(2024, 1, 2))
        .unwrap();
    assert_relative_eq!(value, 1000.0);
}

#[test]
fn test_scenario_b_constant() {
    let prices = two_member_table();
    let portfolio = PortfolioBuilder::new(1000.0)
        .build(&definition(WeightingKind::Constant, &["AAA", "BBB"]), &prices)
        .unwrap();

    assert_relative_eq!(portfolio.shares("AAA").unwrap(), 1000.0 / 30.0);
    assert_eq!(portfolio.shares("AAA"), portfolio.shares("BBB"));

    let value = IndexValuator::new(1000.0)
        .value_at(&portfolio, &prices, date(2024, 1, 2))
        .unwrap();
    assert_relative_eq!(value, 1000.0, epsilon = 1e-9);
}

#[test]
fn test_scenario_c_market_cap() {
    let prices = two_member_table();
    let definition = IndexDefinition::market_cap("CAP", ["AAA", "BBB"], vec![100.0, 300.0]).unwrap();
    let portfolio = PortfolioBuilder::new(1000.0)
        .build(&definition, &prices)
        .unwrap();

    assert_relative_eq!(portfolio.shares("AAA").unwrap(), 25.0);
    assert_relative_eq!(portfolio.shares("BBB").unwrap(), 37.5);
}

#[test]
fn test_scenario_d_missing_start_price() {
    let prices = two_member_table();
    let err = PortfolioBuilder::new(1000.0)
        .build(&definition(WeightingKind::EqualWeight, &["AAA", "CCC"]), &prices)
        .unwrap_err();

    match err {
        IndexError::MissingStartPrice { symbol, date: d } => {
            assert_eq!(symbol, "CCC");
            assert_eq!(d, date(2024, 1, 2));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_scenario_e_missing_member_contributes_nothing() {
    let prices = PriceTable::build(&[
        Quote::new(date(2024, 1, 2), "AAA", 10.0),
        Quote::new(date(2024, 1, 2), "BBB", 20.0),
        Quote::new(date(2024, 1, 3), "AAA", 11.0),
    ]);
    let valuator = IndexValuator::new(1000.0);
    let portfolio = PortfolioBuilder::new(1000.0)
        .build(&definition(WeightingKind::EqualWeight, &["AAA", "BBB"]), &prices)
        .unwrap();

    let series = valuator.value_series(&portfolio, &prices);
    assert_relative_eq!(series.get(date(2024, 1, 3)).unwrap(), 50.0 * 11.0);
    assert!(valuator.value_at(&portfolio, &prices, date(2024, 1, 3)).is_err());
}

#[test]
fn test_scenario_f_comparison_alignment() {
    let mut quotes = Vec::new();
    for day in 2..=5 {
        quotes.push(Quote::new(date(2024, 1, day), "AAA", 10.0 + day as f64));
        if day >= 3 {
            quotes.push(Quote::new(date(2024, 1, day), "REF", 100.0 + day as f64));
        }
    }
    let prices = PriceTable::build(&quotes);
    let valuator = IndexValuator::new(1000.0);

    let portfolio = PortfolioBuilder::new(1000.0)
        .build(&definition(WeightingKind::EqualWeight, &["AAA"]), &prices)
        .unwrap();
    let index = valuator.value_series(&portfolio, &prices);
    let benchmark = valuator
        .benchmark_series(&Benchmark::new("REF", 10.0), portfolio.start_date(), &prices)
        .unwrap();

    let comparison = compare(&index, &benchmark, date(2024, 1, 2), date(2024, 1, 5)).unwrap();
    assert_eq!(comparison.len(), 4);
    assert_eq!(comparison.rows()[0].benchmark, None);
    assert_relative_eq!(comparison.rows()[0].index.unwrap(), 1000.0);
    assert_relative_eq!(comparison.rows()[3].benchmark.unwrap(), 1050.0);
    assert_eq!(comparison.complete_rows().count(), 3);
    assert_eq!(comparison.benchmark_name(), "REF_comparison");
}

#[rstest]
#[case::equal_weight(WeightingKind::EqualWeight)]
#[case::constant(WeightingKind::Constant)]
#[case::market_cap(WeightingKind::MarketCap)]
fn test_fresh_portfolio_is_worth_target_value(#[case] kind: WeightingKind) {
    let prices = wide_table();
    let members = ["AAA", "BBB", "CCC", "DDD", "EEE"];
    let portfolio = PortfolioBuilder::new(10_000.0)
        .build(&definition(kind, &members), &prices)
        .unwrap();

    let value = IndexValuator::new(10_000.0)
        .value_at(&portfolio, &prices, portfolio.start_date())
        .unwrap();
    assert_relative_eq!(value, 10_000.0, max_relative = 1e-12);
}

#[rstest]
#[case(date(2024, 1, 2))]
#[case(date(2024, 1, 4))]
fn test_weighting_properties_at_any_start(#[case] start: NaiveDate) {
    let prices = wide_table();
    let members = ["AAA", "BBB", "CCC", "DDD", "EEE"];
    let builder = PortfolioBuilder::new(10_000.0);

    let equal = builder
        .build(
            &definition(WeightingKind::EqualWeight, &members).with_start_date(start),
            &prices,
        )
        .unwrap();
    for holding in equal.holdings() {
        assert_relative_eq!(holding.start_value(), 2_000.0, max_relative = 1e-12);
    }

    let constant = builder
        .build(
            &definition(WeightingKind::Constant, &members).with_start_date(start),
            &prices,
        )
        .unwrap();
    let first = constant.holdings()[0].shares;
    assert!(constant.holdings().iter().all(|h| h.shares == first));
    assert_relative_eq!(constant.start_value(), 10_000.0, max_relative = 1e-12);

    let cap_definition = definition(WeightingKind::MarketCap, &members).with_start_date(start);
    let caps = builder.build(&cap_definition, &prices).unwrap();
    let total_cap: f64 = (1..=5).map(|i| 100.0 * i as f64).sum();
    for holding in caps.holdings() {
        let cap = cap_definition.market_cap_of(&holding.symbol).unwrap();
        assert_relative_eq!(
            holding.start_value() / 10_000.0,
            cap / total_cap,
            max_relative = 1e-12
        );
    }
}

#[test]
fn test_price_table_ignores_quote_order() {
    let quotes = vec![
        Quote::new(date(2024, 1, 2), "AAA", 10.0),
        Quote::new(date(2024, 1, 3), "BBB", 21.0),
        Quote::new(date(2024, 1, 2), "BBB", 20.0),
        Quote::new(date(2024, 1, 4), "AAA", 12.0),
    ];
    let mut reversed = quotes.clone();
    reversed.reverse();
    let mut rotated = quotes.clone();
    rotated.rotate_left(2);

    let table = PriceTable::build(&quotes);
    assert_eq!(table, PriceTable::build(&reversed));
    assert_eq!(table, PriceTable::build(&rotated));
}

#[test]
fn test_rejected_entry_does_not_block_others() {
    let content = r#"{"asset_indexes": [
        {"NAME": "BROKEN", "TYPE": "MARKET_CAP", "MEMBERS": ["AAA", "BBB"], "MARKET_CAP": [1]},
        {"NAME": "EQ", "TYPE": "EQUAL_WEIGHT", "MEMBERS": ["AAA", "BBB"], "CREATED_DATE": "2024-01-02"}
    ]}"#;
    let set = IndexDefinitionSet::from_json_str(content).unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.rejected().len(), 1);

    let portfolio = PortfolioBuilder::new(1000.0)
        .build(set.get("EQ").unwrap(), &two_member_table())
        .unwrap();
    assert_relative_eq!(portfolio.start_value(), 1000.0);
}

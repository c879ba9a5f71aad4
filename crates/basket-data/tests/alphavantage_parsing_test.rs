//! Integration tests for turning Alpha Vantage payloads into cached quotes

use basket_data::alphavantage::ResponseParser;
use basket_data::archive::{load_responses, save_responses};
use basket_data::cache::{QuoteFilter, SqliteCache};
use chrono::NaiveDate;
use rstest::rstest;
use serde_json::{Value, json};

fn daily(symbol: &str, rows: &[(&str, &str)]) -> Value {
    let series: serde_json::Map<String, Value> = rows
        .iter()
        .map(|(date, close)| ((*date).to_string(), json!({"1. open": close, "4. close": close})))
        .collect();
    json!({
        "Meta Data": {"1. Information": "Daily Prices", "2. Symbol": symbol},
        "Time Series (Daily)": series
    })
}

#[test]
fn test_archive_parse_cache_workflow() {
    let payloads = vec![
        daily("AAPL", &[("2015-12-31", "105.26"), ("2016-01-04", "105.35"), ("2016-01-05", "102.71")]),
        daily("FFIV", &[("2016-01-04", "95.10"), ("2016-01-05", "94.20")]),
        json!({"Error Message": "Invalid API call. Please retry or visit the documentation."}),
    ];

    let path = std::env::temp_dir()
        .join("basket_parsing_workflow")
        .join("quotes.json");
    save_responses(&path, &payloads).unwrap();
    let archived = load_responses(&path).unwrap();
    assert_eq!(archived.len(), 3);

    let parser = ResponseParser::new().with_earliest(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap());
    let parsed = parser.parse_all(&archived);
    assert_eq!(parsed.len(), 2);

    let cache = SqliteCache::in_memory().unwrap();
    for series in &parsed {
        cache.put_quotes(&series.quotes).unwrap();
    }

    let stats = cache.stats().unwrap();
    assert_eq!(stats.total_quotes, 4);
    assert_eq!(stats.unique_symbols, 2);
    assert_eq!(stats.first_date, NaiveDate::from_ymd_opt(2016, 1, 4));

    let aapl = cache.get_quotes(&QuoteFilter::all().symbols(["AAPL"])).unwrap();
    assert_eq!(aapl.len(), 2);
    assert_eq!(aapl[1].close, 102.71);

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
}

#[rstest]
#[case(json!({"Information": "The **demo** API key is for demo purposes only."}))]
#[case(json!({"Meta Data": {"1. Information": "x"}}))]
#[case(json!({"Meta Data": {"2. Symbol": "AAPL"}}))]
#[case(json!([1, 2, 3]))]
fn test_unusable_payloads_are_rejected(#[case] payload: Value) {
    assert!(ResponseParser::new().parse(&payload).is_err());
}

#[test]
fn test_weekly_series_is_accepted() {
    let payload = json!({
        "Meta Data": {"2. Symbol": "NASDX"},
        "Weekly Time Series": {"2024-09-20": {"4. close": "40.10"}}
    });
    let parsed = ResponseParser::new().parse(&payload).unwrap();
    assert_eq!(parsed.quotes.len(), 1);
    assert_eq!(parsed.quotes[0].close, 40.10);
}

//! Pearson correlation of two symbols' closes.

use crate::error::{IndexError, Result};
use crate::price_table::PriceTable;
use chrono::NaiveDate;

/// Correlation of two symbols over their shared priced dates.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationResult {
    /// First symbol
    pub first: String,
    /// Second symbol
    pub second: String,
    /// Pearson coefficient in [-1, 1]
    pub coefficient: f64,
    /// Number of dates both symbols were priced on
    pub observations: usize,
    /// First shared date
    pub start: NaiveDate,
    /// Last shared date
    pub end: NaiveDate,
}

/// Pearson correlation of `a` and `b` on dates where both are priced, from `since` on.
pub fn correlation(
    prices: &PriceTable,
    a: &str,
    b: &str,
    since: Option<NaiveDate>,
) -> Result<CorrelationResult> {
    let pairs: Vec<(NaiveDate, f64, f64)> = prices
        .dates()
        .filter(|date| since.is_none_or(|s| *date >= s))
        .filter_map(|date| Some((date, prices.get(a, date)?, prices.get(b, date)?)))
        .collect();

    let n = pairs.len();
    let (Some(&(start, _, _)), Some(&(end, _, _))) = (pairs.first(), pairs.last()) else {
        return Err(IndexError::InsufficientData(format!(
            "{} and {} share no priced dates",
            a, b
        )));
    };
    if n < 2 {
        return Err(IndexError::InsufficientData(format!(
            "{} and {} share {} priced date, need at least 2",
            a, b, n
        )));
    }

    let mean_x = pairs.iter().map(|p| p.1).sum::<f64>() / n as f64;
    let mean_y = pairs.iter().map(|p| p.2).sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (_, x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return Err(IndexError::InsufficientData(format!(
            "{} or {} has constant closes",
            a, b
        )));
    }

    Ok(CorrelationResult {
        first: a.to_string(),
        second: b.to_string(),
        coefficient: (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0),
        observations: n,
        start,
        end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use basket_data::Quote;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(rows: &[(u32, f64, f64)]) -> PriceTable {
        let quotes: Vec<Quote> = rows
            .iter()
            .flat_map(|(day, a, b)| {
                [
                    Quote::new(date(2024, 1, *day), "AAA", *a),
                    Quote::new(date(2024, 1, *day), "BBB", *b),
                ]
            })
            .collect();
        PriceTable::build(&quotes)
    }

    #[test]
    fn test_perfect_positive() {
        let prices = table(&[(2, 1.0, 10.0), (3, 2.0, 20.0), (4, 3.0, 30.0)]);
        let result = correlation(&prices, "AAA", "BBB", None).unwrap();
        assert_relative_eq!(result.coefficient, 1.0, epsilon = 1e-12);
        assert_eq!(result.observations, 3);
        assert_eq!(result.start, date(2024, 1, 2));
    }

    #[test]
    fn test_perfect_negative_since() {
        let prices = table(&[(2, 5.0, 5.0), (3, 1.0, 3.0), (4, 2.0, 2.0), (5, 3.0, 1.0)]);
        let result = correlation(&prices, "AAA", "BBB", Some(date(2024, 1, 3))).unwrap();
        assert_relative_eq!(result.coefficient, -1.0, epsilon = 1e-12);
        assert_eq!(result.observations, 3);
    }

    #[test]
    fn test_insufficient_data() {
        let prices = table(&[(2, 1.0, 10.0)]);
        assert!(matches!(
            correlation(&prices, "AAA", "BBB", None),
            Err(IndexError::InsufficientData(_))
        ));
        let flat = table(&[(2, 1.0, 10.0), (3, 1.0, 11.0)]);
        assert!(correlation(&flat, "AAA", "BBB", None).is_err());
        assert!(correlation(&flat, "AAA", "ZZZ", None).is_err());
    }
}

//! Monday to Friday business-day calendar. No holidays.

use chrono::{Datelike, NaiveDate, Weekday};

/// Whether `date` falls on Monday through Friday.
pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Business days from `start` to `end`, both inclusive. Empty when `start > end`.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekend_excluded() {
        // Fri 2024-01-05 .. Tue 2024-01-09
        let days = business_days(date(2024, 1, 5), date(2024, 1, 9));
        assert_eq!(days, vec![date(2024, 1, 5), date(2024, 1, 8), date(2024, 1, 9)]);
    }

    #[test]
    fn test_single_day_range() {
        assert_eq!(business_days(date(2024, 1, 2), date(2024, 1, 2)), vec![date(2024, 1, 2)]);
        assert!(business_days(date(2024, 1, 6), date(2024, 1, 6)).is_empty());
    }

    #[test]
    fn test_reversed_range_is_empty() {
        assert!(business_days(date(2024, 1, 9), date(2024, 1, 2)).is_empty());
    }
}

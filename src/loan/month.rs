//! Calendar-month helpers
//!
//! Loan dates are whole months: every date is normalised to the 1st and
//! offsets are counted with year*12+month arithmetic, ignoring the day.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::{LoanError, Result};

/// Normalise any date to the first day of its month
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Build a first-of-month date, `None` for an out-of-range year/month
pub fn year_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Whole-month difference `to - from` (negative when `to` precedes `from`)
pub fn month_offset(from: NaiveDate, to: NaiveDate) -> i64 {
    let from_index = from.year() as i64 * 12 + from.month0() as i64;
    let to_index = to.year() as i64 * 12 + to.month0() as i64;
    to_index - from_index
}

/// Date `months` after `start`, saturating at the calendar maximum
pub fn add_months(start: NaiveDate, months: u32) -> NaiveDate {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Parse a `yyyy-MM` string into the first of that month.
///
/// Persisted inputs sometimes carry a full ISO date or timestamp
/// (`2025-03-01`, `2025-03-01T00:00:00.000Z`); only the year and month
/// are kept.
pub fn parse_month(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let invalid = || LoanError::InvalidMonth {
        value: value.to_string(),
    };

    let head = trimmed.get(..7).ok_or_else(invalid)?;
    let (year, month) = head.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    year_month(year, month).ok_or_else(invalid)
}

/// Format a date as `yyyy-MM`
pub fn format_month(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Serde adapter storing dates as `yyyy-MM` strings
pub mod serde_month {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_month(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_month(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(year: i32, month: u32) -> NaiveDate {
        year_month(year, month).unwrap()
    }

    #[test]
    fn test_month_offset_ignores_day() {
        let start = ym(2024, 11);
        let later = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        assert_eq!(month_offset(start, later), 3);
        assert_eq!(month_offset(later, start), -3);
        assert_eq!(month_offset(start, start), 0);
    }

    #[test]
    fn test_add_months_crosses_year() {
        assert_eq!(add_months(ym(2024, 11), 3), ym(2025, 2));
        assert_eq!(add_months(ym(2024, 1), 240), ym(2044, 1));
    }

    #[test]
    fn test_parse_month_variants() {
        assert_eq!(parse_month("2025-03").unwrap(), ym(2025, 3));
        assert_eq!(parse_month("2025-03-17").unwrap(), ym(2025, 3));
        assert_eq!(parse_month("2025-03-01T00:00:00.000Z").unwrap(), ym(2025, 3));
        assert!(parse_month("2025-13").is_err());
        assert!(parse_month("March 2025").is_err());
        assert!(parse_month("").is_err());
    }

    #[test]
    fn test_format_month() {
        assert_eq!(format_month(ym(2031, 7)), "2031-07");
    }
}

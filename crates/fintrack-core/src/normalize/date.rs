//! Date normalization
//!
//! Numeric dates resolve month-first (US convention): `02/03/2025` is
//! February 3rd. A day-first reading is only used when the month-first one
//! is impossible (`15/01/2024`).

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{Error, Result};

/// Numeric formats, tried in order. `%y` comes first: `%Y` would read a
/// two-digit year as year 24 AD, while `%y` rejects four-digit years.
const NUMERIC_FORMATS: [&str; 5] = [
    "%m/%d/%y", // 01/15/24
    "%m/%d/%Y", // 01/15/2024
    "%Y-%m-%d", // 2024-01-15
    "%m-%d-%Y", // 01-15-2024
    "%d/%m/%Y", // 15/01/2024 (only reached when month-first is impossible)
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

fn month_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z]{3,9})\.?\s+(\d{1,2}),?\s+(\d{4})$").expect("valid regex")
    })
}

/// Parse a free-form date string into a calendar date
pub fn normalize(raw: &str) -> Result<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(Error::Parse("empty date".to_string()));
    }

    for fmt in NUMERIC_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Exports written by spreadsheets sometimes carry a midnight time
    if let Some((date_part, _time)) = s.split_once(' ') {
        if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
            return Ok(date);
        }
    }

    parse_month_name(s).ok_or_else(|| Error::Parse(format!("Unable to parse date: {}", raw)))
}

/// "Feb 14, 2025", "Sept 3 2024", "january 9, 2025"
fn parse_month_name(s: &str) -> Option<NaiveDate> {
    let caps = month_name_re().captures(s)?;
    let month = month_number(&caps[1])?;
    let day: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Any prefix of a month name of at least 3 letters: Sep, Sept, September
fn month_number(token: &str) -> Option<u32> {
    let token = token.to_lowercase();
    MONTHS
        .iter()
        .position(|name| name.starts_with(&token))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numeric_formats() {
        assert_eq!(normalize("01/15/2024").unwrap(), ymd(2024, 1, 15));
        assert_eq!(normalize("1/5/2024").unwrap(), ymd(2024, 1, 5));
        assert_eq!(normalize("01/15/24").unwrap(), ymd(2024, 1, 15));
        assert_eq!(normalize("2024-01-15").unwrap(), ymd(2024, 1, 15));
        assert_eq!(normalize("01-15-2024").unwrap(), ymd(2024, 1, 15));
        assert_eq!(normalize("2024-01-15 00:00:00").unwrap(), ymd(2024, 1, 15));
    }

    #[test]
    fn test_ambiguous_dates_are_month_first() {
        assert_eq!(normalize("02/03/2025").unwrap(), ymd(2025, 2, 3));
        // Day-first only when month-first is impossible
        assert_eq!(normalize("15/01/2024").unwrap(), ymd(2024, 1, 15));
    }

    #[test]
    fn test_month_name_forms() {
        assert_eq!(normalize("Feb 14, 2025").unwrap(), ymd(2025, 2, 14));
        assert_eq!(normalize("Feb 4, 2025").unwrap(), ymd(2025, 2, 4));
        assert_eq!(normalize("FEB 14, 2025").unwrap(), ymd(2025, 2, 14));
        assert_eq!(normalize("sep 30, 2024").unwrap(), ymd(2024, 9, 30));
        assert_eq!(normalize("Sept 30, 2024").unwrap(), ymd(2024, 9, 30));
        assert_eq!(normalize("September 30 2024").unwrap(), ymd(2024, 9, 30));
        assert_eq!(normalize("Dec. 1, 2024").unwrap(), ymd(2024, 12, 1));
    }

    #[test]
    fn test_month_name_equals_numeric() {
        assert_eq!(
            normalize("Feb 14, 2025").unwrap(),
            normalize("02/14/2025").unwrap()
        );
    }

    #[test]
    fn test_rejects_invalid_dates() {
        assert!(matches!(normalize(""), Err(Error::Parse(_))));
        assert!(matches!(normalize("not a date"), Err(Error::Parse(_))));
        assert!(matches!(normalize("Feb 30, 2025"), Err(Error::Parse(_))));
        assert!(matches!(normalize("Foo 3, 2025"), Err(Error::Parse(_))));
        assert!(matches!(normalize("13/13/2024"), Err(Error::Parse(_))));
    }
}

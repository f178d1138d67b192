//! Permissive calendar-date parsing for the Date column.
//!
//! Accepts ISO dates, US slash/dash dates, dotted European dates and
//! month-name forms such as "Jan 5 2024" or "5 January 2024". Date-time
//! strings are accepted and truncated to the day.

use chrono::{NaiveDate, NaiveDateTime};

// Ambiguous slash dates are read month-first. Two-digit years come before
// four-digit ones so "01/15/24" is not read as the year 24.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2024-01-15
    "%Y/%m/%d", // 2024/01/15
    "%Y.%m.%d", // 2024.01.15
    "%m/%d/%y", // 01/15/24
    "%m/%d/%Y", // 01/15/2024
    "%m-%d-%Y", // 01-15-2024
    "%d.%m.%Y", // 15.01.2024
    "%B %d %Y", // Jan 15 2024, January 15 2024
    "%d %B %Y", // 15 Jan 2024, 15 January 2024
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse a date field, returning `None` if no known format matches.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

//! Date value normalization for date-typed filter fields
//!
//! Grid date filters arrive as free-form strings. Values are reduced to a
//! calendar day; time of day and offset are discarded.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// ISO-like datetime layouts tried after RFC 3339
const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Day-first layouts, only tried when no ISO-like layout matches
const DMY_DATETIME_FORMATS: &[&str] = &["%d-%m-%Y %H:%M:%S", "%d-%m-%Y %H:%M"];

const DMY_DATE_FORMATS: &[&str] = &["%d-%m-%Y"];

/// Parse a filter value into a calendar day
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    // Keep the day as written, not as shifted to UTC
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local().date());
    }

    parse_with(value, ISO_DATETIME_FORMATS, ISO_DATE_FORMATS)
        .or_else(|| parse_with(value, DMY_DATETIME_FORMATS, DMY_DATE_FORMATS))
}

fn parse_with(value: &str, datetime_formats: &[&str], date_formats: &[&str]) -> Option<NaiveDate> {
    datetime_formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            date_formats
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

/// Render a day the way SQLite's `date()` does
pub fn to_sql_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_iso_date() {
        assert_eq!(parse_date("2024-03-05"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024/03/05"), Some(day(2024, 3, 5)));
    }

    #[test]
    fn parses_rfc3339_keeping_written_day() {
        assert_eq!(
            parse_date("2024-03-05T23:30:00+05:00"),
            Some(day(2024, 3, 5))
        );
        assert_eq!(
            parse_date("2024-03-05T00:10:00.000Z"),
            Some(day(2024, 3, 5))
        );
    }

    #[test]
    fn parses_iso_datetime_without_offset() {
        assert_eq!(parse_date("2024-03-05T10:11:12"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05 10:11:12.345"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05 10:11"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("2024/03/05 10:11:12"), Some(day(2024, 3, 5)));
    }

    #[test]
    fn falls_back_to_day_month_year() {
        assert_eq!(parse_date("05-03-2024"), Some(day(2024, 3, 5)));
        assert_eq!(parse_date("31-12-2023 08:00"), Some(day(2023, 12, 31)));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("2024-02-30"), None);
        assert_eq!(parse_date("13-13-2024"), None);
    }

    #[test]
    fn sql_day_format() {
        assert_eq!(to_sql_day(day(2024, 1, 9)), "2024-01-09");
    }
}

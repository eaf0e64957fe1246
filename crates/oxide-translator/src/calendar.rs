//! Parsing of calendar expressions given as text to `%d` / `%t`.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};

/// Datetime layouts tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

/// Date layouts tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Parses a calendar expression. All results are UTC, the same clock the
/// translator reads `now` from.
///
/// Accepted forms:
/// - the keywords `now`, `today`, `yesterday` and `tomorrow`, relative
///   to `now`;
/// - an integer, read as a Unix timestamp in seconds (UTC);
/// - RFC 3339 text, converted to UTC;
/// - ISO-like dates and datetimes (`2024-01-02`, `2024-01-02 10:30:00`,
///   `2024-01-02T10:30`, `2024/01/02`, `02.01.2024`, ...).
///
/// Returns `None` for anything else.
#[must_use]
pub fn parse(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let text = text.trim();
    let midnight = |date: NaiveDate| date.and_hms_opt(0, 0, 0);

    match text.to_ascii_lowercase().as_str() {
        "now" => return Some(now),
        "today" => return midnight(now.date()),
        "yesterday" => return now.date().checked_sub_days(Days::new(1)).and_then(midnight),
        "tomorrow" => return now.date().checked_add_days(Days::new(1)).and_then(midnight),
        _ => {}
    }

    if let Ok(seconds) = text.parse::<i64>() {
        return DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .and_then(midnight)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .unwrap()
    }

    fn now() -> NaiveDateTime {
        at(2024, 3, 15, 12, 30, 45)
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse("now", now()), Some(now()));
        assert_eq!(parse("Today", now()), Some(at(2024, 3, 15, 0, 0, 0)));
        assert_eq!(parse("yesterday", now()), Some(at(2024, 3, 14, 0, 0, 0)));
        assert_eq!(parse("tomorrow", now()), Some(at(2024, 3, 16, 0, 0, 0)));
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(parse("0", now()), Some(at(1970, 1, 1, 0, 0, 0)));
        assert_eq!(
            parse("1700000000", now()),
            Some(at(2023, 11, 14, 22, 13, 20))
        );
    }

    #[test]
    fn test_iso_forms() {
        assert_eq!(
            parse("2024-01-02", now()),
            Some(at(2024, 1, 2, 0, 0, 0))
        );
        assert_eq!(
            parse("2024-01-02 10:30:00", now()),
            Some(at(2024, 1, 2, 10, 30, 0))
        );
        assert_eq!(
            parse("2024-01-02T10:30", now()),
            Some(at(2024, 1, 2, 10, 30, 0))
        );
        assert_eq!(
            parse("02.01.2024", now()),
            Some(at(2024, 1, 2, 0, 0, 0))
        );
    }

    #[test]
    fn test_rfc3339_is_converted_to_utc() {
        assert_eq!(
            parse("2024-01-02T10:00:00+02:00", now()),
            Some(at(2024, 1, 2, 8, 0, 0))
        );
    }

    #[test]
    fn test_garbage() {
        assert_eq!(parse("next tuesday", now()), None);
        assert_eq!(parse("2024-13-01", now()), None);
        assert_eq!(parse("", now()), None);
    }
}

//! Cell coercion helpers shared by type detection and filter evaluation.
//!
//! Detection and filtering must agree on what a "number", "boolean" or "date" cell is, otherwise
//! a column classified from text would not filter consistently. Both go through these functions.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

use crate::types::Value;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%a, %d %b %Y",
];

/// Years outside this window are treated as parse accidents rather than dates.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1000..=9999;

/// Parse a boolean keyword (case-insensitive `true/false/1/0/yes/no`).
pub fn parse_bool_keyword(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Interpret a cell as a boolean: native booleans, or strings holding a boolean keyword.
pub fn cell_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Utf8(s) => parse_bool_keyword(s),
        _ => None,
    }
}

/// Interpret a cell as a number.
///
/// Native floats are returned as-is, including `NaN` and infinities. Strings must parse to a
/// finite number, so text such as `"inf"` or `"NaN"` is not numeric.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Int64(i) => Some(*i as f64),
        Value::Float64(f) => Some(*f),
        Value::Utf8(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}

/// Interpret a cell as a date: native dates, or strings accepted by [`parse_date`].
pub fn cell_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Utf8(s) => parse_date(s),
        _ => None,
    }
}

/// Flexible date parser.
///
/// Accepts RFC 3339 / RFC 2822 timestamps, common ISO-like date-times and a handful of
/// day/month spellings. Purely numeric strings are never dates, and results with a year outside
/// `1000..=9999` are rejected. Naive inputs are interpreted as UTC.
pub fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.len() < 6 || s.parse::<f64>().is_ok() {
        return None;
    }

    let parsed = DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })?;

    PLAUSIBLE_YEARS.contains(&parsed.year()).then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn bool_keywords_are_case_insensitive() {
        assert_eq!(parse_bool_keyword("TRUE"), Some(true));
        assert_eq!(parse_bool_keyword(" Yes "), Some(true));
        assert_eq!(parse_bool_keyword("0"), Some(false));
        assert_eq!(parse_bool_keyword("No"), Some(false));
        assert_eq!(parse_bool_keyword("y"), None);
        assert_eq!(cell_bool(&Value::Bool(false)), Some(false));
        assert_eq!(cell_bool(&Value::Int64(1)), None);
    }

    #[test]
    fn numbers_from_strings_must_be_finite() {
        assert_eq!(coerce_number(&Value::from(" 42.5 ")), Some(42.5));
        assert_eq!(coerce_number(&Value::from("-3")), Some(-3.0));
        assert_eq!(coerce_number(&Value::from("inf")), None);
        assert_eq!(coerce_number(&Value::from("NaN")), None);
        assert_eq!(coerce_number(&Value::from("12 apples")), None);
        assert_eq!(coerce_number(&Value::from("")), None);
    }

    #[test]
    fn native_non_finite_floats_are_numbers() {
        assert_eq!(coerce_number(&Value::Float64(f64::INFINITY)), Some(f64::INFINITY));
        assert!(coerce_number(&Value::Float64(f64::NAN)).is_some_and(f64::is_nan));
        assert_eq!(coerce_number(&Value::Int64(7)), Some(7.0));
        assert_eq!(coerce_number(&Value::Bool(true)), None);
    }

    #[test]
    fn parses_common_date_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024-03-15"), Some(expected));
        assert_eq!(parse_date("2024/03/15"), Some(expected));
        assert_eq!(parse_date("03/15/2024"), Some(expected));
        assert_eq!(parse_date("15.03.2024"), Some(expected));
        assert_eq!(parse_date("Mar 15, 2024"), Some(expected));
        assert_eq!(
            parse_date("2024-03-15T10:30:00Z"),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap())
        );
        assert_eq!(
            parse_date("2024-03-15 10:30:00"),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn rejects_nonsense_dates() {
        assert_eq!(parse_date("20240315"), None);
        assert_eq!(parse_date("hello world"), None);
        assert_eq!(parse_date("2024-13-45"), None);
        assert_eq!(parse_date("0001-01-01"), None);
        assert_eq!(parse_date("1.5"), None);
    }
}

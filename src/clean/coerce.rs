//! Best-effort conversions from untyped cells to the types the cleaner needs.
//! Every function returns `None` instead of failing.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::model::ScalarValue;

/// Month-first for ambiguous slash dates, matching how US POS systems export.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parses a calendar date from text. Any time of day is discarded.
pub fn coerce_date(value: &ScalarValue) -> Option<NaiveDate> {
    let ScalarValue::String(text) = value else {
        return None;
    };
    parse_date(text.trim())
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }

    if text.len() == 8 && text.bytes().all(|byte| byte.is_ascii_digit()) {
        let year = text[..4].parse().ok()?;
        let month = text[4..6].parse().ok()?;
        let day = text[6..].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
    {
        return Some(date);
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|timestamp| timestamp.date())
}

/// Parses a money amount. `$` and `,` are stripped from text before parsing;
/// numbers are converted without going through binary rounding noise.
pub fn coerce_revenue(value: &ScalarValue) -> Option<Decimal> {
    match value {
        ScalarValue::Integer(value) => Some(Decimal::from(*value)),
        // f64 Display is the shortest text that round-trips, so 50.005 stays 50.005.
        ScalarValue::Number(value) if value.is_finite() => parse_decimal(&value.to_string()),
        ScalarValue::String(text) => {
            let stripped: String = text.chars().filter(|ch| !matches!(ch, '$' | ',')).collect();
            parse_decimal(stripped.trim())
        }
        ScalarValue::Number(_) | ScalarValue::Null => None,
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.is_empty() {
        return None;
    }
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Parses a whole quantity. Integral floats such as `3.0` are accepted,
/// fractional ones are not.
pub fn coerce_quantity(value: &ScalarValue) -> Option<i64> {
    match value {
        ScalarValue::Integer(value) => Some(*value),
        ScalarValue::Number(value) => integral(*value),
        ScalarValue::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral))
        }
        ScalarValue::Null => None,
    }
}

fn integral(value: f64) -> Option<i64> {
    let in_range = value.abs() < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then(|| value as i64)
}

/// Trimmed text for identifier-like fields; numbers are rendered as text.
pub fn coerce_text(value: &ScalarValue) -> Option<String> {
    value.as_text()
}

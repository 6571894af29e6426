//! Cell value coercion. Nothing in here fails: every function returns either
//! a value or its documented default.

use crate::domain::model::CellValue;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const TRUTHY_TOKENS: &[&str] = &["true", "1", "1.0", "t", "yes", "y"];

/// Formats accepted as a complete date or date-time.
const FULL_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const FULL_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d %B %Y", "%d %b %Y", "%B %d, %Y", "%b %d, %Y"];

static PARTIAL_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})(?:-(\d{1,2})(?:-(\d{1,2}))?)?$").expect("valid partial date regex")
});

/// Spreadsheet serial dates count days from 1899-12-30.
fn serial_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(chrono::NaiveTime::MIN)
}

pub fn is_empty(value: &CellValue) -> bool {
    match value {
        CellValue::Empty => true,
        CellValue::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
        }
        CellValue::Number(n) => n.is_nan(),
        CellValue::Bool(_) | CellValue::Date(_) => false,
    }
}

/// Emptiness for values already converted to JSON; adds empty arrays and objects.
pub fn is_empty_json(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
        }
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Convert a spreadsheet serial (days since 1899-12-30) to a timestamp.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let millis = (serial * 86_400_000.0).round();
    if millis.abs() > i64::MAX as f64 {
        return None;
    }
    serial_epoch().checked_add_signed(Duration::try_milliseconds(millis as i64)?)
}

pub fn format_date(value: &NaiveDateTime) -> String {
    value.format("%Y-%m-%d").to_string()
}

/// Integral numbers render without a fractional part.
pub fn number_to_string(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Plain text for any non-empty cell.
pub fn cell_text(value: &CellValue) -> Option<String> {
    if is_empty(value) {
        return None;
    }
    match value {
        CellValue::String(s) => Some(s.trim().to_string()),
        CellValue::Number(n) => Some(number_to_string(*n)),
        CellValue::Bool(b) => Some(b.to_string()),
        CellValue::Date(d) => Some(format_date(d)),
        CellValue::Empty => None,
    }
}

/// Parse a string that is a complete date or date-time.
pub fn parse_full_date_str(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in FULL_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    FULL_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}

/// Canonical form of a year, year-month or year-month-day string.
fn parse_partial_date_str(s: &str) -> Option<String> {
    let caps = PARTIAL_DATE.captures(s)?;
    let year: i32 = caps.get(1)?.as_str().parse().ok()?;

    match (caps.get(2), caps.get(3)) {
        (None, _) => Some(format!("{:04}", year)),
        (Some(month), None) => {
            let month: u32 = month.as_str().parse().ok()?;
            (1..=12)
                .contains(&month)
                .then(|| format!("{:04}-{:02}", year, month))
        }
        (Some(month), Some(day)) => {
            let date = NaiveDate::from_ymd_opt(
                year,
                month.as_str().parse().ok()?,
                day.as_str().parse().ok()?,
            )?;
            Some(date.format("%Y-%m-%d").to_string())
        }
    }
}

/// Partial or whole date in canonical form.
///
/// - `None` for empty cells.
/// - Date cells and serial numbers become `YYYY-MM-DD`.
/// - `YYYY`, `YYYY-MM`, `YYYY-MM-DD` keep their precision.
/// - Anything unrecognised comes back as its trimmed text.
pub fn parse_partial_date(value: &CellValue) -> Option<String> {
    if is_empty(value) {
        return None;
    }
    match value {
        CellValue::Date(d) => Some(format_date(d)),
        CellValue::Number(n) => Some(
            serial_to_datetime(*n)
                .map(|d| format_date(&d))
                .unwrap_or_else(|| number_to_string(*n)),
        ),
        CellValue::String(s) => {
            let trimmed = s.trim();
            parse_partial_date_str(trimmed)
                .or_else(|| parse_full_date_str(trimmed).map(|d| format_date(&d)))
                .or_else(|| Some(trimmed.to_string()))
        }
        CellValue::Bool(_) | CellValue::Empty => cell_text(value),
    }
}

/// The cell as a complete date, if it is one.
pub fn as_full_date(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Date(d) => Some(format_date(d)),
        CellValue::String(s) => parse_full_date_str(s).map(|d| format_date(&d)),
        _ => None,
    }
}

fn split_trimmed(s: &str, delimiter: char) -> Vec<String> {
    s.split(delimiter)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a multi-value cell. Dates are never split; commas take precedence over semicolons.
pub fn clean_and_split(value: &CellValue) -> Vec<String> {
    if is_empty(value) {
        return Vec::new();
    }
    if let Some(date) = as_full_date(value) {
        return vec![date];
    }
    match value {
        CellValue::String(s) if s.contains(',') => split_trimmed(s, ','),
        CellValue::String(s) if s.contains(';') => split_trimmed(s, ';'),
        other => cell_text(other).into_iter().collect(),
    }
}

/// Like [`clean_and_split`], with every piece read as a partial date and numbers as serials.
pub fn clean_and_split_dates(value: &CellValue) -> Vec<String> {
    match value {
        CellValue::Number(_) => parse_partial_date(value).into_iter().collect(),
        _ => clean_and_split(value)
            .into_iter()
            .filter_map(|piece| parse_partial_date(&CellValue::String(piece)))
            .collect(),
    }
}

/// Truthy tokens only; anything else is `false`.
pub fn parse_booleanish(value: &CellValue) -> bool {
    match value {
        CellValue::Bool(b) => *b,
        CellValue::Number(n) => *n == 1.0,
        CellValue::String(s) => {
            let token = s.trim().to_ascii_lowercase();
            TRUTHY_TOKENS.contains(&token.as_str())
        }
        CellValue::Empty | CellValue::Date(_) => false,
    }
}

/// Upper-cased, at most two characters.
pub fn country_code(value: &CellValue) -> Option<String> {
    cell_text(value).map(|code| code.to_uppercase().chars().take(2).collect())
}

/// Strips the trailing `.0` left by numeric code cells; nothing left means absent.
pub fn post_code(value: &CellValue) -> Option<String> {
    cell_text(value)
        .map(|code| match code.strip_suffix(".0") {
            Some(stripped) => stripped.trim_end().to_string(),
            None => code,
        })
        .filter(|code| !code.is_empty())
}

/// Scalar as JSON: strings trimmed, numbers and booleans kept, date cells as ISO dates.
pub fn plain_value(value: &CellValue) -> Option<Value> {
    if is_empty(value) {
        return None;
    }
    match value {
        CellValue::String(s) => Some(Value::String(s.trim().to_string())),
        CellValue::Number(n) => serde_json::Number::from_f64(*n).map(|num| {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                Value::from(*n as i64)
            } else {
                Value::Number(num)
            }
        }),
        CellValue::Bool(b) => Some(Value::Bool(*b)),
        CellValue::Date(d) => Some(Value::String(format_date(d))),
        CellValue::Empty => None,
    }
}

//! Field extraction from loosely typed rows.
//!
//! Dynamic typing means the same column can arrive as a number in one row
//! and a string in the next (an IMO of `9123456` vs `"IMO9123456"`), so the
//! helpers here accept either representation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Datetime layouts accepted for the casualty date, tried in order after
/// RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts accepted for the casualty date (midnight UTC).
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parses a casualty date. Returns `None` for anything unrecognized.
#[must_use]
pub fn parse_casualty_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }
    }

    None
}

/// Gets a field as text. Numbers are rendered the way a spreadsheet would
/// show them (integral floats without a trailing `.0`). Empty strings and
/// `null` are treated as absent.
#[must_use]
pub fn get_text(record: &serde_json::Value, field: &str) -> Option<String> {
    match record.get(field)? {
        serde_json::Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_owned())
        }
        serde_json::Value::Number(n) => Some(number_to_text(n)),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    }
}

/// Gets a field as a finite `f64`, parsing strings when necessary.
#[must_use]
pub fn get_f64(record: &serde_json::Value, field: &str) -> Option<f64> {
    let value = record.get(field)?;
    let parsed = value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<f64>().ok()))?;
    parsed.is_finite().then_some(parsed)
}

/// Renders a JSON number without spurious fractional zeros.
fn number_to_text(n: &serde_json::Number) -> String {
    if n.is_f64()
        && let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() < 1e15
    {
        #[allow(clippy::cast_possible_truncation)]
        return (f as i64).to_string();
    }
    n.to_string()
}

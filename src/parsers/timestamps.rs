use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Epoch values at or above this are read as milliseconds, below it as seconds
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a JSON timestamp value into an absolute UTC time
///
/// Accepts RFC 3339 strings, naive date-times (taken as UTC), and numeric Unix epochs in
/// seconds or milliseconds. Anything else yields `None`.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            if let Some(int) = n.as_i64() {
                from_epoch(int)
            } else {
                let float = n.as_f64()?;
                if !float.is_finite() {
                    return None;
                }
                if float.abs() >= MILLIS_THRESHOLD as f64 {
                    DateTime::from_timestamp_millis(float as i64)
                } else {
                    DateTime::from_timestamp_millis((float * 1000.0) as i64)
                }
            }
        }
        Value::String(s) => parse_timestamp_str(s),
        _ => None,
    }
}

pub fn parse_timestamp_str(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(dt.and_utc());
    }

    raw.parse::<i64>().ok().and_then(from_epoch)
}

fn from_epoch(value: i64) -> Option<DateTime<Utc>> {
    if value.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(value)
    } else {
        DateTime::from_timestamp(value, 0)
    }
}

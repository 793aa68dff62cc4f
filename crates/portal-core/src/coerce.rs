//! Coercion of raw row values into comparable keys, driven by the declared
//! column type.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use portal_domain::{row::value_text, ColumnType};
use serde_json::Value;

/// A row value coerced for comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Millis(i64),
    Text(String),
}

impl SortKey {
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Millis(a), SortKey::Millis(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (a, b) => a.rank().cmp(&b.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Millis(_) => 1,
            SortKey::Text(_) => 2,
        }
    }
}

/// Coerces a value for sorting under `column_type`.
///
/// Numbers and currency parse leniently (garbage becomes `0`), dates become
/// epoch millis (missing or unparseable becomes `0`), and everything else is
/// compared as lowercase text with null as `""`.
pub fn sort_key(value: Option<&Value>, column_type: ColumnType) -> SortKey {
    match column_type {
        ColumnType::Number | ColumnType::Currency => SortKey::Number(parse_number(value)),
        ColumnType::Date => SortKey::Millis(parse_epoch_millis(value)),
        ColumnType::Text | ColumnType::Boolean | ColumnType::Url => SortKey::Text(
            value
                .and_then(value_text)
                .unwrap_or_default()
                .to_lowercase(),
        ),
    }
}

pub fn parse_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => parse_float_prefix(text),
        _ => 0.0,
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Parses the longest numeric prefix of `input`, ignoring leading
/// whitespace. `"12.5kg"` is `12.5`, `"$5"` is `0`.
pub fn parse_float_prefix(input: &str) -> f64 {
    let text = input.trim_start();
    let bytes = text.as_bytes();
    let mut cursor = 0;
    let mut valid_to = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        cursor = 1;
    }
    while cursor < bytes.len() {
        match bytes[cursor] {
            b'0'..=b'9' => {
                seen_digit = true;
                cursor += 1;
                valid_to = cursor;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                cursor += 1;
                if seen_digit {
                    valid_to = cursor;
                }
            }
            b'e' | b'E' if seen_digit => {
                let mut probe = cursor + 1;
                if matches!(bytes.get(probe), Some(b'+') | Some(b'-')) {
                    probe += 1;
                }
                if !bytes.get(probe).is_some_and(u8::is_ascii_digit) {
                    break;
                }
                cursor = probe;
                while bytes.get(cursor).is_some_and(u8::is_ascii_digit) {
                    cursor += 1;
                }
                valid_to = cursor;
                break;
            }
            _ => break,
        }
    }

    let parsed = text[..valid_to].parse::<f64>().unwrap_or(0.0);
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

pub fn parse_epoch_millis(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::String(text)) => parse_date_text(text).unwrap_or(0),
        Some(Value::Number(number)) => number
            .as_i64()
            .or_else(|| number.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        _ => 0,
    }
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses ISO-style date or date-time text into epoch millis. Values without
/// an offset are read as UTC.
pub fn parse_date_text(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp_millis());
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(text, format) {
            return Some(parsed.timestamp_millis());
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lenient_float_parsing_takes_numeric_prefix() {
        assert_eq!(parse_float_prefix("12.5kg"), 12.5);
        assert_eq!(parse_float_prefix("  -3"), -3.0);
        assert_eq!(parse_float_prefix(".5"), 0.5);
        assert_eq!(parse_float_prefix("1,200"), 1.0);
        assert_eq!(parse_float_prefix("2e3 units"), 2000.0);
        assert_eq!(parse_float_prefix("4e"), 4.0);
        assert_eq!(parse_float_prefix("$5"), 0.0);
        assert_eq!(parse_float_prefix("abc"), 0.0);
        assert_eq!(parse_float_prefix(""), 0.0);
        assert_eq!(parse_float_prefix("-"), 0.0);
    }

    #[test]
    fn currency_garbage_sorts_as_zero() {
        let key = sort_key(Some(&json!("abc")), ColumnType::Currency);
        assert_eq!(key, SortKey::Number(0.0));
        assert_eq!(sort_key(None, ColumnType::Number), SortKey::Number(0.0));
        assert_eq!(
            sort_key(Some(&json!(true)), ColumnType::Number),
            SortKey::Number(0.0)
        );
    }

    #[test]
    fn dates_parse_in_common_shapes() {
        let day = parse_date_text("2024-03-01").expect("date");
        let midnight = parse_date_text("2024-03-01T00:00:00Z").expect("rfc3339");
        let platform = parse_date_text("2024-03-01T00:00:00.000+0000").expect("offset");
        let naive = parse_date_text("2024-03-01T00:00:00").expect("naive");
        assert_eq!(day, midnight);
        assert_eq!(day, platform);
        assert_eq!(day, naive);
        assert_eq!(parse_date_text("next tuesday"), None);
        assert_eq!(
            sort_key(Some(&json!("garbage")), ColumnType::Date),
            SortKey::Millis(0)
        );
        assert_eq!(
            sort_key(Some(&json!(1_700_000_000_000_i64)), ColumnType::Date),
            SortKey::Millis(1_700_000_000_000)
        );
    }

    #[test]
    fn text_compares_case_insensitively_with_null_as_empty() {
        let upper = sort_key(Some(&json!("Beta")), ColumnType::Text);
        let lower = sort_key(Some(&json!("alpha")), ColumnType::Text);
        assert_eq!(lower.compare(&upper), Ordering::Less);
        assert_eq!(
            sort_key(Some(&Value::Null), ColumnType::Text),
            SortKey::Text(String::new())
        );
    }
}

use chrono::{DateTime, NaiveDate, Utc};
use portal_domain::{ColumnDescriptor, ColumnType, Row};

use crate::coerce::{parse_date_text, parse_number};

/// Formats currency amounts for presentation.
pub trait CurrencyFormatter: Send + Sync {
    fn format_amount(&self, amount: f64, currency: &str) -> String;
}

/// Formats dates for presentation.
pub trait DateFormatter: Send + Sync {
    fn format_date(&self, date: NaiveDate) -> String;
}

/// Formatters used when no locale-specific implementation is supplied.
#[derive(Debug, Clone)]
pub struct DefaultFormatters {
    pub currency: String,
    pub date_format: String,
}

impl Default for DefaultFormatters {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            date_format: "%b %d, %Y".into(),
        }
    }
}

impl DefaultFormatters {
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            ..Self::default()
        }
    }
}

impl CurrencyFormatter for DefaultFormatters {
    fn format_amount(&self, amount: f64, currency: &str) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        let grouped = group_thousands(amount.abs());
        match currency {
            "USD" => format!("{sign}${grouped}"),
            "EUR" => format!("{sign}€{grouped}"),
            "GBP" => format!("{sign}£{grouped}"),
            other => format!("{sign}{grouped} {other}"),
        }
    }
}

impl DateFormatter for DefaultFormatters {
    fn format_date(&self, date: NaiveDate) -> String {
        date.format(&self.date_format).to_string()
    }
}

fn group_thousands(amount: f64) -> String {
    let fixed = format!("{amount:.2}");
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{grouped}.{cents}")
}

/// Renders one cell of `row` for display under `column`. Currency cells are
/// formatted in `currency`.
pub fn display_cell<F>(row: &Row, column: &ColumnDescriptor, formatters: &F, currency: &str) -> String
where
    F: CurrencyFormatter + DateFormatter,
{
    match column.column_type {
        ColumnType::Currency => match row.get(&column.field_name) {
            Some(value) if !value.is_null() => {
                formatters.format_amount(parse_number(Some(value)), currency)
            }
            _ => String::new(),
        },
        ColumnType::Date => row
            .text(&column.field_name)
            .and_then(|text| parse_date_text(&text))
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|moment| formatters.format_date(moment.date_naive()))
            .unwrap_or_default(),
        ColumnType::Boolean => match row.get(&column.field_name).and_then(|v| v.as_bool()) {
            Some(true) => "Yes".into(),
            Some(false) => "No".into(),
            None => String::new(),
        },
        ColumnType::Url => row
            .text(column.sort_key())
            .or_else(|| row.text(&column.field_name))
            .unwrap_or_default(),
        ColumnType::Text | ColumnType::Number => {
            row.text(&column.field_name).unwrap_or_default()
        }
    }
}

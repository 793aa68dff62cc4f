//! Export rendering for finder results: CSV, or an HTML table that
//! spreadsheet tools open as a workbook.

use chrono::NaiveDateTime;
use portal_domain::{CatalogColumn, ExportFormat, Row};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportFile {
    pub file_name: String,
    pub content: String,
}

/// `Constituents_extract_20240301_093015.csv`.
pub fn export_file_name(now: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "Constituents_extract_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Splits `Lookup.Field` into its relation and field parts.
pub fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.split_once('.') {
        Some((lookup, field)) => (Some(lookup), field),
        None => (None, path),
    }
}

/// Header label for an exported column path, falling back to the path.
pub fn header_label(catalog: &[CatalogColumn], path: &str) -> String {
    let (lookup, field) = split_path(path);
    catalog
        .iter()
        .find(|column| column.field_name == field && column.lookup_api_name.as_deref() == lookup)
        .map(|column| column.label.clone())
        .unwrap_or_else(|| path.to_string())
}

pub fn render(format: ExportFormat, rows: &[Row], columns: &[String], catalog: &[CatalogColumn]) -> String {
    match format {
        ExportFormat::Csv => build_csv(rows, columns, catalog),
        ExportFormat::Xls => build_html_table(rows, columns, catalog),
    }
}

pub fn build_csv(rows: &[Row], columns: &[String], catalog: &[CatalogColumn]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        columns
            .iter()
            .map(|path| csv_field(&header_label(catalog, path)))
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        lines.push(
            columns
                .iter()
                .map(|path| csv_field(&row.text(path).unwrap_or_default()))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    let mut csv = lines.join("\n");
    csv.push('\n');
    csv
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn build_html_table(rows: &[Row], columns: &[String], catalog: &[CatalogColumn]) -> String {
    let mut html = String::from("<table>\n<tr>");
    for path in columns {
        html.push_str(&format!("<th>{}</th>", escape_html(&header_label(catalog, path))));
    }
    html.push_str("</tr>\n");
    for row in rows {
        html.push_str("<tr>");
        for path in columns {
            html.push_str(&format!(
                "<td>{}</td>",
                escape_html(&row.text(path).unwrap_or_default())
            ));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");
    html
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn catalog() -> Vec<CatalogColumn> {
        vec![
            CatalogColumn {
                label: "Full Name".into(),
                field_name: "Name".into(),
                lookup_api_name: None,
            },
            CatalogColumn {
                label: "Account Owner".into(),
                field_name: "Name".into(),
                lookup_api_name: Some("Owner".into()),
            },
        ]
    }

    #[test]
    fn csv_resolves_labels_and_lookup_paths() {
        let rows = vec![Row::new()
            .with("Name", "Smith, Ada")
            .with("Owner", json!({ "Name": "Grace \"G\" Hopper" }))];
        let columns = vec!["Name".to_string(), "Owner.Name".to_string(), "Region".to_string()];
        let csv = build_csv(&rows, &columns, &catalog());
        assert_eq!(
            csv,
            "Full Name,Account Owner,Region\n\"Smith, Ada\",\"Grace \"\"G\"\" Hopper\",\n"
        );
    }

    #[test]
    fn html_table_escapes_cells() {
        let rows = vec![Row::new().with("Name", "<b>A & B</b>")];
        let html = build_html_table(&rows, &["Name".to_string()], &catalog());
        assert!(html.contains("<th>Full Name</th>"));
        assert!(html.contains("<td>&lt;b&gt;A &amp; B&lt;/b&gt;</td>"));
    }

    #[test]
    fn file_names_carry_timestamp_and_extension() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|date| date.and_hms_opt(9, 30, 15))
            .expect("timestamp");
        assert_eq!(
            export_file_name(now, ExportFormat::Csv),
            "Constituents_extract_20240301_093015.csv"
        );
        assert_eq!(
            export_file_name(now, ExportFormat::Xls),
            "Constituents_extract_20240301_093015.xls"
        );
    }
}

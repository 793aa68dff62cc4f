//! Static column declarations for list views.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Declared value type of a column; drives sort coercion and cell display.
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Currency,
    Date,
    Boolean,
    Url,
}

impl ColumnType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" | "string" => Some(ColumnType::Text),
            "number" => Some(ColumnType::Number),
            "currency" => Some(ColumnType::Currency),
            "date" | "datetime" => Some(ColumnType::Date),
            "boolean" | "bool" => Some(ColumnType::Boolean),
            "url" => Some(ColumnType::Url),
            _ => None,
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Currency)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Currency => "currency",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
            ColumnType::Url => "url",
        };
        f.write_str(label)
    }
}

/// Describes one displayed column. Never mutated once a list is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub field_name: String,
    pub label: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub sortable: bool,
    /// Field compared when sorting. Link columns sort by their label field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_field: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(
        field_name: impl Into<String>,
        label: impl Into<String>,
        column_type: ColumnType,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
            column_type,
            sortable: true,
            sort_field: None,
        }
    }

    pub fn text(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field_name, label, ColumnType::Text)
    }

    pub fn number(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field_name, label, ColumnType::Number)
    }

    pub fn currency(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field_name, label, ColumnType::Currency)
    }

    pub fn date(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(field_name, label, ColumnType::Date)
    }

    /// A link column displayed from `field_name` and sorted by `label_field`.
    pub fn url(
        field_name: impl Into<String>,
        label: impl Into<String>,
        label_field: impl Into<String>,
    ) -> Self {
        Self {
            sort_field: Some(label_field.into()),
            ..Self::new(field_name, label, ColumnType::Url)
        }
    }

    pub fn unsortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn sort_key(&self) -> &str {
        self.sort_field.as_deref().unwrap_or(&self.field_name)
    }

    /// Type used for sorting. Link columns compare their label as text.
    pub fn sort_type(&self) -> ColumnType {
        match self.column_type {
            ColumnType::Url => ColumnType::Text,
            other => other,
        }
    }
}

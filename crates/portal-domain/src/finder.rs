//! Map finder types: server-declared filter metadata, search criteria,
//! selection payloads and export options.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{common::SortDirection, row::Row};

/// Radius choices offered next to the address search, in miles.
pub const RADIUS_OPTIONS_MILES: [u32; 6] = [1, 5, 10, 25, 50, 4000];

/// Placeholder entry prepended to picklists; never a real value.
pub const NONE_OPTION: &str = "--None--";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Comparison applied by a filter parameter.
pub enum FilterOperator {
    #[default]
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "includes")]
    Includes,
}

impl FilterOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOperator::Eq => "=",
            FilterOperator::Gt => ">",
            FilterOperator::Ge => ">=",
            FilterOperator::Lt => "<",
            FilterOperator::Le => "<=",
            FilterOperator::Includes => "includes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "=" => Some(FilterOperator::Eq),
            ">" => Some(FilterOperator::Gt),
            ">=" => Some(FilterOperator::Ge),
            "<" => Some(FilterOperator::Lt),
            "<=" => Some(FilterOperator::Le),
            "includes" => Some(FilterOperator::Includes),
            _ => None,
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
/// Store-side data type of a filterable field.
pub enum FieldDataType {
    #[default]
    String,
    Picklist,
    Multipicklist,
    Reference,
    Date,
    Datetime,
    Double,
    Currency,
    Boolean,
    #[serde(other)]
    Other,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Input widget a filter field is rendered with.
pub enum FilterInput {
    #[default]
    Text,
    Date,
    Checkbox,
    Number,
    Combobox,
    MultiSelect,
    RecordPicker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PicklistOption {
    pub label: String,
    pub value: String,
    /// Option stands for a value range rather than a literal.
    #[serde(default)]
    pub is_range: bool,
}

/// Filter field declared by the server for one map instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterField {
    pub key: String,
    pub label: String,
    pub field_api_name: String,
    #[serde(default)]
    pub data_type: FieldDataType,
    #[serde(default)]
    pub input: FilterInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_api_name: Option<String>,
    #[serde(default)]
    pub options: Vec<PicklistOption>,
    #[serde(default)]
    pub multi_row: bool,
    #[serde(default)]
    pub improperly_configured: bool,
}

impl FilterField {
    /// Multi-value input: explicit multi-select or a multi-row combobox.
    pub fn is_multi_select(&self) -> bool {
        self.input == FilterInput::MultiSelect
            || (self.input == FilterInput::Combobox && self.multi_row)
    }

    pub fn option(&self, value: &str) -> Option<&PicklistOption> {
        self.options.iter().find(|option| option.value == value)
    }
}

/// One filter clause sent to the search layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParam {
    pub field_name: String,
    pub operator: FilterOperator,
    pub value: String,
    pub field_type: FieldDataType,
    #[serde(default)]
    pub is_range: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Everything the user most recently searched for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub filters: Vec<FilterParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_miles: Option<u32>,
    /// Extra constraints contributed by auxiliary picklists, keyed by field.
    #[serde(default)]
    pub augmentation: BTreeMap<String, Vec<String>>,
}

impl SearchCriteria {
    pub fn has_location(&self) -> bool {
        self.origin.is_some() && self.radius_miles.is_some()
    }

    /// No filters, no complete location, and no augmentation.
    pub fn is_blank(&self) -> bool {
        self.filters.is_empty() && !self.has_location() && self.augmentation.is_empty()
    }
}

/// Selection as sent to the server: excluded ids when everything is
/// selected, included ids otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionPayload {
    pub record_ids: Vec<String>,
    pub export_all: bool,
}

/// Criteria plus selection, re-sent for export and campaign operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterWrapper {
    #[serde(flatten)]
    pub criteria: SearchCriteria,
    #[serde(flatten)]
    pub selection: SelectionPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: usize,
    pub page_size: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

/// One server page of constituents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub total_size: usize,
    pub records: Vec<Row>,
}

/// A persisted filter value scoped to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilter {
    pub owner: String,
    pub key: String,
    pub operator: FilterOperator,
    pub value: String,
    #[serde(default)]
    pub is_range: bool,
    pub label: String,
}

/// Column known to the server for one map instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub label: String,
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_api_name: Option<String>,
}

impl CatalogColumn {
    /// Dotted path addressing the column in a fetched row.
    pub fn path(&self) -> String {
        match &self.lookup_api_name {
            Some(lookup) => format!("{lookup}.{}", self.field_name),
            None => self.field_name.clone(),
        }
    }
}

/// Maps a row field onto a marker location property (`Street`, `Latitude`...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressField {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookup_api_name: Option<String>,
    pub location_property: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xls,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xls => "xls",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn criteria_blankness_requires_complete_location() {
        let mut criteria = SearchCriteria {
            origin: Some(Coordinates {
                latitude: 43.05,
                longitude: -75.4,
            }),
            ..SearchCriteria::default()
        };
        assert!(criteria.is_blank());

        criteria.radius_miles = Some(25);
        assert!(!criteria.is_blank());
    }

    #[test]
    fn wrapper_flattens_criteria_and_selection() {
        let wrapper = FilterWrapper {
            criteria: SearchCriteria::default(),
            selection: SelectionPayload {
                record_ids: vec!["a".into()],
                export_all: true,
            },
        };
        let json = serde_json::to_value(&wrapper).expect("wrapper json");
        assert_eq!(json["export_all"], true);
        assert_eq!(json["record_ids"][0], "a");
        assert!(json["filters"].as_array().expect("filters").is_empty());
    }

    #[test]
    fn operators_use_symbols_on_the_wire() {
        let json = serde_json::to_string(&FilterOperator::Ge).expect("operator");
        assert_eq!(json, "\">=\"");
        assert_eq!(FilterOperator::parse("includes"), Some(FilterOperator::Includes));
    }
}

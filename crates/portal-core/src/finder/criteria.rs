//! Filter inputs as the user edits them, and their conversion into search
//! parameters and saved filters.

use portal_domain::{
    FieldDataType, FilterField, FilterInput, FilterOperator, FilterParam, SavedFilter, NONE_OPTION,
};

use crate::CoreError;

pub const ADDRESS_FILTER_KEY: &str = "address";
pub const RADIUS_FILTER_KEY: &str = "radius";

/// Current value of one server-declared filter field.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterInputState {
    pub field: FilterField,
    pub value: Option<String>,
    pub operator: FilterOperator,
    pub is_range: bool,
}

impl FilterInputState {
    pub fn new(field: FilterField) -> Self {
        Self {
            field,
            value: None,
            operator: FilterOperator::Eq,
            is_range: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.field.key
    }

    /// Free-form entry (text, number, date, checkbox, record picker).
    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value.filter(|text| !text.trim().is_empty());
    }

    pub fn set_operator(&mut self, operator: FilterOperator) {
        self.operator = operator;
    }

    /// Picklist entry. Multi-select picklists join every real choice with
    /// `;` and match with `includes`; other picklists keep the last choice
    /// and inherit its range flag.
    pub fn set_selection(&mut self, selected: &[String]) {
        let choices: Vec<&str> = selected
            .iter()
            .map(String::as_str)
            .filter(|choice| *choice != NONE_OPTION && !choice.trim().is_empty())
            .collect();

        if self.field.data_type == FieldDataType::Multipicklist && self.field.is_multi_select() {
            self.value = (!choices.is_empty()).then(|| choices.join(";"));
            self.operator = FilterOperator::Includes;
            self.is_range = false;
            return;
        }

        let last = choices.last().map(|choice| choice.to_string());
        self.is_range = last
            .as_deref()
            .and_then(|choice| self.field.option(choice))
            .is_some_and(|option| option.is_range);
        self.value = last;
    }

    /// Selected picklist values, split back out of the stored value.
    pub fn selected_values(&self) -> Vec<String> {
        match &self.value {
            Some(value) if self.field.input == FilterInput::MultiSelect => {
                value.split(';').map(str::to_string).collect()
            }
            Some(value) => vec![value.clone()],
            None => Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        self.value = None;
        self.operator = FilterOperator::Eq;
        self.is_range = false;
    }

    /// Search parameter for this input, or `None` when it contributes nothing.
    pub fn to_param(&self) -> Option<FilterParam> {
        if self.field.improperly_configured {
            return None;
        }
        let value = self.value.as_ref()?;
        Some(FilterParam {
            field_name: self.field.field_api_name.clone(),
            operator: self.operator,
            value: value.clone(),
            field_type: self.field.data_type,
            is_range: self.is_range,
            lookup_field: self.field.lookup_api_name.clone(),
        })
    }

    pub fn to_saved(&self, owner: &str) -> Option<SavedFilter> {
        let value = self.value.as_ref()?;
        Some(SavedFilter {
            owner: owner.to_string(),
            key: self.field.key.clone(),
            operator: self.operator,
            value: value.clone(),
            is_range: self.is_range,
            label: self.field.label.clone(),
        })
    }

    pub fn apply_saved(&mut self, saved: &SavedFilter) {
        self.value = Some(saved.value.clone()).filter(|value| !value.is_empty());
        self.operator = saved.operator;
        self.is_range = saved.is_range;
    }
}

/// Address plus radius for a proximity search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationInput {
    pub address: Option<String>,
    pub radius_miles: Option<u32>,
}

impl LocationInput {
    pub fn address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }

    /// Address and radius must be given together.
    pub fn validate(&self) -> Result<(), CoreError> {
        match (self.address(), self.radius_miles) {
            (None, Some(_)) => Err(CoreError::Validation(
                "Address is required when radius is specified.".into(),
            )),
            (Some(_), None) => Err(CoreError::Validation(
                "Radius is required when address is specified.".into(),
            )),
            _ => Ok(()),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.address().is_some() && self.radius_miles.is_some()
    }

    pub fn reset(&mut self) {
        self.address = None;
        self.radius_miles = None;
    }
}

/// Saved filters for every input with a value plus the location pair.
pub fn collect_saved_filters(
    inputs: &[FilterInputState],
    location: &LocationInput,
    owner: &str,
) -> Vec<SavedFilter> {
    let mut saved: Vec<SavedFilter> = inputs
        .iter()
        .filter_map(|input| input.to_saved(owner))
        .collect();
    if let Some(address) = location.address() {
        saved.push(location_filter(owner, ADDRESS_FILTER_KEY, "Address", address.to_string()));
    }
    if let Some(radius) = location.radius_miles {
        saved.push(location_filter(owner, RADIUS_FILTER_KEY, "Radius", radius.to_string()));
    }
    saved
}

fn location_filter(owner: &str, key: &str, label: &str, value: String) -> SavedFilter {
    SavedFilter {
        owner: owner.to_string(),
        key: key.to_string(),
        operator: FilterOperator::Eq,
        value,
        is_range: false,
        label: label.to_string(),
    }
}

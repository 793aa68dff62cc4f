use std::collections::BTreeMap;

use portal_domain::{Address, AddressField, CatalogColumn, Coordinates, Row};
use serde::Serialize;

use crate::wizard::SelectedContact;

/// Placeholder shown for empty description values.
pub const EMPTY_VALUE: &str = "--";

/// Which row fields feed map markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerConfig {
    pub address_fields: Vec<AddressField>,
    pub title_field: String,
    pub description: Vec<CatalogColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Row id, or `origin` for the searched address.
    pub value: String,
    pub title: String,
    pub location: BTreeMap<String, String>,
    pub description: Vec<String>,
}

/// Location properties (`Street`, `City`, `Latitude`...) read from a row.
pub fn extract_location(row: &Row, fields: &[AddressField]) -> BTreeMap<String, String> {
    fields
        .iter()
        .filter_map(|field| {
            let path = match &field.lookup_api_name {
                Some(lookup) => format!("{lookup}.{}", field.field_name),
                None => field.field_name.clone(),
            };
            row.text(&path)
                .map(|value| (field.location_property.clone(), value))
        })
        .collect()
}

pub fn build_markers(
    rows: &[Row],
    config: &MarkerConfig,
    origin: Option<(&str, Coordinates)>,
) -> Vec<MapMarker> {
    let mut markers = Vec::with_capacity(rows.len() + 1);
    if let Some((address, coordinates)) = origin {
        markers.push(MapMarker {
            value: "origin".into(),
            title: address.to_string(),
            location: BTreeMap::from([
                ("Latitude".to_string(), coordinates.latitude.to_string()),
                ("Longitude".to_string(), coordinates.longitude.to_string()),
            ]),
            description: Vec::new(),
        });
    }
    for row in rows {
        markers.push(MapMarker {
            value: row.id().unwrap_or_default().to_string(),
            title: row.text(&config.title_field).unwrap_or_default(),
            location: extract_location(row, &config.address_fields),
            description: config
                .description
                .iter()
                .map(|column| {
                    let value = row
                        .text(&column.path())
                        .filter(|value| !value.trim().is_empty())
                        .unwrap_or_else(|| EMPTY_VALUE.to_string());
                    format!("{}: {value}", column.label)
                })
                .collect(),
        });
    }
    markers
}

/// Turns a checked result row into a contact for the trip planner.
pub fn selected_contact(
    row: &Row,
    contact_field: &str,
    name_field: &str,
    address_fields: &[AddressField],
) -> Option<SelectedContact> {
    let row_id = row.id()?.to_string();
    let contact_id = row.text(contact_field)?;
    let location = extract_location(row, address_fields);
    let part = |key: &str| location.get(key).cloned();
    let address = Address {
        street: part("Street"),
        city: part("City"),
        state: part("State"),
        postal_code: part("PostalCode"),
        country: part("Country"),
    };
    Some(SelectedContact {
        row_id,
        contact_id,
        name: row.text(name_field).unwrap_or_default(),
        address: (address != Address::default()).then_some(address),
    })
}

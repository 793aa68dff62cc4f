use async_trait::async_trait;
use portal_domain::{
    CatalogColumn, Coordinates, FilterField, FilterWrapper, PageRequest, Row, SavedFilter,
    SearchCriteria, SearchPage, SortDirection,
};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Columns and ordering requested for an export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

/// Server side of the map finder. Every call is scoped to one map instance.
#[async_trait]
pub trait ConstituentSearch: Send + Sync {
    async fn filter_fields(&self, map_instance: &str) -> Result<Vec<FilterField>, CoreError>;
    /// Columns shown in the results table.
    async fn table_columns(&self, map_instance: &str) -> Result<Vec<CatalogColumn>, CoreError>;
    /// Every column that can be exported, used to label export headers.
    async fn column_catalog(&self, map_instance: &str) -> Result<Vec<CatalogColumn>, CoreError>;
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, CoreError>;
    async fn search(
        &self,
        map_instance: &str,
        criteria: &SearchCriteria,
        page: &PageRequest,
    ) -> Result<SearchPage, CoreError>;
    async fn export_rows(
        &self,
        map_instance: &str,
        wrapper: &FilterWrapper,
        request: &ExportRequest,
    ) -> Result<Vec<Row>, CoreError>;
    async fn add_campaign_members(
        &self,
        map_instance: &str,
        wrapper: &FilterWrapper,
        campaign_id: &str,
    ) -> Result<(), CoreError>;
    async fn save_filters(&self, map_instance: &str, filters: &[SavedFilter]) -> Result<(), CoreError>;
    async fn load_saved_filter(
        &self,
        map_instance: &str,
        owner: &str,
        key: &str,
    ) -> Result<Option<SavedFilter>, CoreError>;
    async fn delete_saved_filters(&self, map_instance: &str, owner: &str) -> Result<(), CoreError>;
}

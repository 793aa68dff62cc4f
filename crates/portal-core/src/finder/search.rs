use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDateTime;
use futures::future::try_join_all;
use portal_domain::{
    AddressField, CatalogColumn, ExportFormat, FilterWrapper, Row, SearchCriteria,
};
use tracing::{debug, error, info, warn};

use crate::{
    remote::{Notice, Notifier},
    scope::ComponentScope,
    wizard::SelectedContact,
    CoreError,
};

use super::{
    criteria::{collect_saved_filters, FilterInputState, LocationInput, ADDRESS_FILTER_KEY, RADIUS_FILTER_KEY},
    export::{export_file_name, render, ExportFile},
    markers::{build_markers, selected_contact, MapMarker, MarkerConfig},
    paging::ServerPager,
    remote::{ConstituentSearch, ExportRequest},
    selection::SelectionState,
};

/// Map-based constituent search for one map instance: server-declared
/// filters, proximity search, server-paged results, selection, export.
pub struct ConstituentFinder {
    map_instance: String,
    search: Arc<dyn ConstituentSearch>,
    notifier: Arc<dyn Notifier>,
    scope: ComponentScope,
    inputs: Vec<FilterInputState>,
    location: LocationInput,
    augmentation: BTreeMap<String, Vec<String>>,
    columns: Vec<CatalogColumn>,
    catalog: Vec<CatalogColumn>,
    criteria: SearchCriteria,
    searched_address: Option<String>,
    pager: ServerPager,
    selection: SelectionState,
    results: Vec<Row>,
}

impl ConstituentFinder {
    pub fn new(
        map_instance: impl Into<String>,
        search: Arc<dyn ConstituentSearch>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            map_instance: map_instance.into(),
            search,
            notifier,
            scope: ComponentScope::new(),
            inputs: Vec::new(),
            location: LocationInput::default(),
            augmentation: BTreeMap::new(),
            columns: Vec::new(),
            catalog: Vec::new(),
            criteria: SearchCriteria::default(),
            searched_address: None,
            pager: ServerPager::default(),
            selection: SelectionState::default(),
            results: Vec::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.pager = ServerPager::new(page_size);
        self
    }

    /// Loads filter fields and column metadata for the map instance.
    pub async fn initialize(&mut self) -> Result<(), CoreError> {
        let search = &self.search;
        let instance = self.map_instance.as_str();
        let loaded = self
            .scope
            .run(async {
                futures::try_join!(
                    search.filter_fields(instance),
                    search.table_columns(instance),
                    search.column_catalog(instance),
                )
            })
            .await;

        let (fields, columns, catalog) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                if !err.is_cancelled() {
                    error!(map = %self.map_instance, error = %err, "map metadata load failed");
                    self.notifier
                        .notify(Notice::error("Unable to load map", err.to_string()));
                }
                return Err(err);
            }
        };

        let misconfigured = fields.iter().filter(|f| f.improperly_configured).count();
        if misconfigured > 0 {
            warn!(map = %self.map_instance, misconfigured, "filter fields skipped");
        }
        self.inputs = fields.into_iter().map(FilterInputState::new).collect();
        if let Some(first) = columns.first() {
            self.pager.set_default_sort(first.path());
        }
        self.columns = columns;
        self.catalog = catalog;
        debug!(map = %self.map_instance, filters = self.inputs.len(), "map finder ready");
        Ok(())
    }

    pub fn inputs(&self) -> &[FilterInputState] {
        &self.inputs
    }

    pub fn input_mut(&mut self, key: &str) -> Option<&mut FilterInputState> {
        self.inputs.iter_mut().find(|input| input.key() == key)
    }

    pub fn location(&self) -> &LocationInput {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut LocationInput {
        &mut self.location
    }

    /// Extra constraint from an auxiliary picklist; empty values remove it.
    pub fn set_augmentation(&mut self, field: impl Into<String>, values: Vec<String>) {
        let field = field.into();
        if values.is_empty() {
            self.augmentation.remove(&field);
        } else {
            self.augmentation.insert(field, values);
        }
    }

    pub fn columns(&self) -> &[CatalogColumn] {
        &self.columns
    }

    pub fn catalog(&self) -> &[CatalogColumn] {
        &self.catalog
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn results(&self) -> &[Row] {
        &self.results
    }

    pub fn pager(&self) -> &ServerPager {
        &self.pager
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn coverage_label(&self) -> String {
        self.pager.coverage_label()
    }

    pub fn page_label(&self) -> String {
        self.pager.page_label()
    }

    pub fn scope(&self) -> &ComponentScope {
        &self.scope
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }

    /// Runs a new search from the current inputs. Selection and paging
    /// start over. A blank search clears the results without a remote call.
    pub async fn search(&mut self) -> Result<usize, CoreError> {
        if let Err(err) = self.location.validate() {
            self.notifier.notify(Notice::error("Error", notice_text(&err)));
            return Err(err);
        }

        let address = self.location.address().map(str::to_string);
        let origin = match &address {
            Some(address) => {
                match self.scope.run(self.search.geocode(address)).await {
                    Ok(Some(coordinates)) => Some(coordinates),
                    Ok(None) => {
                        let err = CoreError::Validation(format!("Address '{address}' could not be located."));
                        self.notifier.notify(Notice::error("Error", notice_text(&err)));
                        return Err(err);
                    }
                    Err(err) => {
                        if !err.is_cancelled() {
                            error!(error = %err, "geocoding failed");
                            self.notifier.notify(Notice::error("Error", err.to_string()));
                        }
                        return Err(err);
                    }
                }
            }
            None => None,
        };

        let criteria = SearchCriteria {
            filters: self.inputs.iter().filter_map(FilterInputState::to_param).collect(),
            origin,
            radius_miles: origin.and(self.location.radius_miles),
            augmentation: self.augmentation.clone(),
        };
        self.selection.reset();
        self.pager.rewind();
        self.searched_address = address;

        if criteria.is_blank() {
            self.notifier.notify(Notice::error(
                "Blank Search",
                "Please enter a filter, or an address and radius, to search.",
            ));
        }
        self.criteria = criteria;
        self.fetch_page().await
    }

    async fn fetch_page(&mut self) -> Result<usize, CoreError> {
        if self.criteria.is_blank() {
            self.results.clear();
            self.pager.set_total(0);
            self.selection.set_total(0);
            return Ok(0);
        }

        let request = self.pager.request();
        let fetched = self
            .scope
            .run(self.search.search(&self.map_instance, &self.criteria, &request))
            .await;
        match fetched {
            Ok(page) => {
                self.pager.set_total(page.total_size);
                self.selection.set_total(page.total_size);
                self.results = page.records;
                info!(
                    map = %self.map_instance,
                    total = page.total_size,
                    offset = request.offset,
                    "constituent search completed"
                );
                Ok(self.results.len())
            }
            Err(err) => {
                if !err.is_cancelled() {
                    error!(map = %self.map_instance, error = %err, "constituent search failed");
                    self.results.clear();
                    self.pager.set_total(0);
                    self.selection.set_total(0);
                    self.notifier.notify(Notice::error("Search failed", err.to_string()));
                }
                Err(err)
            }
        }
    }

    pub async fn next_page(&mut self) -> Result<bool, CoreError> {
        if !self.pager.next() {
            return Ok(false);
        }
        self.fetch_page().await.map(|_| true)
    }

    pub async fn prev_page(&mut self) -> Result<bool, CoreError> {
        if !self.pager.prev() {
            return Ok(false);
        }
        self.fetch_page().await.map(|_| true)
    }

    pub async fn go_to_page(&mut self, page: usize) -> Result<bool, CoreError> {
        if !self.pager.set_page(page) {
            return Ok(false);
        }
        self.fetch_page().await.map(|_| true)
    }

    pub async fn grow_page(&mut self) -> Result<bool, CoreError> {
        if !self.pager.grow() {
            return Ok(false);
        }
        self.fetch_page().await.map(|_| true)
    }

    pub async fn shrink_page(&mut self) -> Result<bool, CoreError> {
        if !self.pager.shrink() {
            return Ok(false);
        }
        self.fetch_page().await.map(|_| true)
    }

    /// Re-sorting would reshuffle rows under an active selection.
    pub fn sort_locked(&self) -> bool {
        !self.selection.is_empty()
    }

    pub async fn sort_by(&mut self, field: &str) -> Result<bool, CoreError> {
        if self.sort_locked() {
            debug!(field, "sort refused while rows are selected");
            return Ok(false);
        }
        self.pager.sort_by(field);
        self.fetch_page().await.map(|_| true)
    }

    pub fn set_row_checked(&mut self, id: &str, checked: bool) {
        self.selection.set_row(id, checked);
    }

    pub fn toggle_all(&mut self) -> bool {
        self.selection.toggle_all()
    }

    /// Checked rows of the current page.
    pub fn checked_rows(&self) -> Vec<&Row> {
        self.results
            .iter()
            .filter(|row| row.id().is_some_and(|id| self.selection.is_checked(id)))
            .collect()
    }

    pub fn selected_contacts(
        &self,
        contact_field: &str,
        name_field: &str,
        address_fields: &[AddressField],
    ) -> Vec<SelectedContact> {
        self.checked_rows()
            .into_iter()
            .filter_map(|row| selected_contact(row, contact_field, name_field, address_fields))
            .collect()
    }

    /// Criteria of the last search plus the current selection.
    pub fn wrapper(&self) -> FilterWrapper {
        FilterWrapper {
            criteria: self.criteria.clone(),
            selection: self.selection.payload(),
        }
    }

    /// Exports the selection. Rows come from the server, never from the
    /// page held locally.
    pub async fn export(
        &self,
        columns: &[String],
        format: ExportFormat,
        now: NaiveDateTime,
    ) -> Result<ExportFile, CoreError> {
        if self.selection.is_empty() {
            return Err(CoreError::InvalidOperation(
                "no constituents selected for export".into(),
            ));
        }
        let wrapper = self.wrapper();
        let request = ExportRequest {
            columns: columns.to_vec(),
            sort_by: self.pager.sort_field().map(str::to_string),
            sort_direction: self.pager.sort_direction(),
        };
        let rows = match self
            .scope
            .run(self.search.export_rows(&self.map_instance, &wrapper, &request))
            .await
        {
            Ok(rows) => rows,
            Err(err) => {
                if !err.is_cancelled() {
                    error!(map = %self.map_instance, error = %err, "export failed");
                    self.notifier.notify(Notice::error("Export failed", err.to_string()));
                }
                return Err(err);
            }
        };

        let file = ExportFile {
            file_name: export_file_name(now, format),
            content: render(format, &rows, columns, &self.catalog),
        };
        info!(file = %file.file_name, rows = rows.len(), "constituents exported");
        Ok(file)
    }

    /// Adds the selection to a campaign and returns how many were sent.
    pub async fn add_to_campaign(&self, campaign_id: &str) -> Result<usize, CoreError> {
        if self.selection.is_empty() {
            return Err(CoreError::InvalidOperation(
                "no constituents selected for the campaign".into(),
            ));
        }
        let wrapper = self.wrapper();
        match self
            .scope
            .run(self.search.add_campaign_members(&self.map_instance, &wrapper, campaign_id))
            .await
        {
            Ok(()) => {
                let count = self.selection.selected_count();
                info!(campaign = campaign_id, count, "campaign members added");
                self.notifier.notify(Notice::success(
                    "Success",
                    format!("{count} constituents added to the campaign."),
                ));
                Ok(count)
            }
            Err(err) => {
                if !err.is_cancelled() {
                    error!(campaign = campaign_id, error = %err, "adding campaign members failed");
                    self.notifier
                        .notify(Notice::error("Error adding to campaign", err.to_string()));
                }
                Err(err)
            }
        }
    }

    pub async fn save_filters(&self, owner: &str) -> Result<usize, CoreError> {
        let filters = collect_saved_filters(&self.inputs, &self.location, owner);
        if filters.is_empty() {
            self.notifier.notify(Notice::error("Error", "No filter to save"));
            return Ok(0);
        }
        match self
            .scope
            .run(self.search.save_filters(&self.map_instance, &filters))
            .await
        {
            Ok(()) => {
                info!(count = filters.len(), "filters saved");
                self.notifier.notify(Notice::success("Success", "Filters saved"));
                Ok(filters.len())
            }
            Err(err) => {
                if !err.is_cancelled() {
                    error!(error = %err, "saving filters failed");
                    self.notifier
                        .notify(Notice::error("Unable to save filters", err.to_string()));
                }
                Err(err)
            }
        }
    }

    /// Restores the owner's saved filters into the inputs and location.
    pub async fn load_saved_filters(&mut self, owner: &str) -> Result<usize, CoreError> {
        let mut keys: Vec<String> = self.inputs.iter().map(|input| input.key().to_string()).collect();
        keys.push(ADDRESS_FILTER_KEY.into());
        keys.push(RADIUS_FILTER_KEY.into());

        let search = &self.search;
        let instance = self.map_instance.as_str();
        let loaded = self
            .scope
            .run(try_join_all(
                keys.iter()
                    .map(|key| search.load_saved_filter(instance, owner, key)),
            ))
            .await;
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                if !err.is_cancelled() {
                    error!(error = %err, "loading saved filters failed");
                    self.notifier
                        .notify(Notice::error("Unable to load filters", err.to_string()));
                }
                return Err(err);
            }
        };

        let mut applied = 0;
        for saved in loaded.into_iter().flatten() {
            match saved.key.as_str() {
                ADDRESS_FILTER_KEY => {
                    self.location.address = Some(saved.value);
                    applied += 1;
                }
                RADIUS_FILTER_KEY => match saved.value.parse() {
                    Ok(radius) => {
                        self.location.radius_miles = Some(radius);
                        applied += 1;
                    }
                    Err(_) => warn!(value = %saved.value, "ignoring unreadable saved radius"),
                },
                key => {
                    if let Some(input) = self.inputs.iter_mut().find(|input| input.key() == key) {
                        input.apply_saved(&saved);
                        applied += 1;
                    }
                }
            }
        }
        if applied == 0 {
            self.notifier
                .notify(Notice::info("No saved filters", "No saved filters were found."));
        }
        debug!(applied, "saved filters restored");
        Ok(applied)
    }

    pub async fn delete_saved_filters(&mut self, owner: &str) -> Result<(), CoreError> {
        match self
            .scope
            .run(self.search.delete_saved_filters(&self.map_instance, owner))
            .await
        {
            Ok(()) => {
                self.reset_inputs();
                self.notifier.notify(Notice::success("Success", "Filters deleted"));
                Ok(())
            }
            Err(err) => {
                if !err.is_cancelled() {
                    error!(error = %err, "deleting saved filters failed");
                    self.notifier
                        .notify(Notice::error("Unable to delete filters", err.to_string()));
                }
                Err(err)
            }
        }
    }

    /// Clears inputs, results and selection.
    pub fn clear(&mut self) {
        self.reset_inputs();
        self.augmentation.clear();
        self.criteria = SearchCriteria::default();
        self.searched_address = None;
        self.results.clear();
        self.selection.reset();
        self.selection.set_total(0);
        self.pager.rewind();
        self.pager.set_total(0);
    }

    pub fn markers(&self, config: &MarkerConfig) -> Vec<MapMarker> {
        let origin = match (&self.searched_address, self.criteria.origin) {
            (Some(address), Some(coordinates)) => Some((address.as_str(), coordinates)),
            _ => None,
        };
        build_markers(&self.results, config, origin)
    }

    fn reset_inputs(&mut self) {
        for input in &mut self.inputs {
            input.reset();
        }
        self.location.reset();
    }
}

fn notice_text(err: &CoreError) -> String {
    match err {
        CoreError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use portal_core::{
    finder::{ConstituentSearch, ExportRequest},
    CoreError, NavTarget, Navigator, Notice, Notifier, TripStore,
};
use portal_domain::{
    CatalogColumn, Coordinates, EventKind, FilterField, FilterWrapper, PageRequest, RecordId, Row,
    SavedFilter, SearchCriteria, SearchPage, TripEvent, TripHeader,
};

/// Trip store that records every call and mints sequential ids.
pub struct MemoryTripStore {
    calls: Mutex<Vec<String>>,
    next_id: AtomicUsize,
    failing_kinds: Mutex<Vec<EventKind>>,
    email_status: Mutex<String>,
    trips: Mutex<HashMap<RecordId, TripHeader>>,
    events: Mutex<Vec<TripEvent>>,
    saved: Mutex<Vec<TripEvent>>,
}

impl MemoryTripStore {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(1),
            failing_kinds: Mutex::new(Vec::new()),
            email_status: Mutex::new("sent".into()),
            trips: Mutex::new(HashMap::new()),
            events: Mutex::new(Vec::new()),
            saved: Mutex::new(Vec::new()),
        }
    }

    pub fn with_trip(self, header: TripHeader, events: Vec<TripEvent>) -> Self {
        if let Some(id) = header.id.clone() {
            self.trips.lock().expect("trips").insert(id, header);
        }
        *self.events.lock().expect("events") = events;
        self
    }

    pub fn fail_saves_of(&self, kind: EventKind) {
        self.failing_kinds.lock().expect("failing").push(kind);
    }

    pub fn heal(&self) {
        self.failing_kinds.lock().expect("failing").clear();
    }

    pub fn set_email_status(&self, status: &str) {
        *self.email_status.lock().expect("status") = status.into();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|call| call.starts_with(prefix)).count()
    }

    pub fn saved_events(&self) -> Vec<TripEvent> {
        self.saved.lock().expect("saved").clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().expect("calls").push(call.into());
    }

    fn mint(&self, prefix: &str) -> RecordId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        RecordId::new(format!("{prefix}{n:03}"))
    }
}

#[async_trait]
impl TripStore for MemoryTripStore {
    async fn load_trip(&self, trip_id: &RecordId) -> Result<TripHeader, CoreError> {
        self.record(format!("load_trip:{trip_id}"));
        self.trips
            .lock()
            .expect("trips")
            .get(trip_id)
            .cloned()
            .ok_or_else(|| CoreError::RecordNotFound(trip_id.to_string()))
    }

    async fn load_events(&self, trip_id: &RecordId) -> Result<Vec<TripEvent>, CoreError> {
        self.record(format!("load_events:{trip_id}"));
        Ok(self.events.lock().expect("events").clone())
    }

    async fn create_trip(&self, header: &TripHeader) -> Result<RecordId, CoreError> {
        self.record("create_trip");
        let id = self.mint("trip");
        let mut stored = header.clone();
        stored.id = Some(id.clone());
        self.trips.lock().expect("trips").insert(id.clone(), stored);
        Ok(id)
    }

    async fn update_trip(&self, header: &TripHeader) -> Result<RecordId, CoreError> {
        self.record("update_trip");
        header
            .id
            .clone()
            .ok_or_else(|| CoreError::InvalidOperation("update without id".into()))
    }

    async fn save_event(&self, event: &TripEvent) -> Result<RecordId, CoreError> {
        let verb = if event.id().is_some() { "update_event" } else { "create_event" };
        self.record(format!("{verb}:{}", event.kind()));
        if self.failing_kinds.lock().expect("failing").contains(&event.kind()) {
            return Err(CoreError::Remote(format!("{} rejected", event.kind())));
        }
        self.saved.lock().expect("saved").push(event.clone());
        Ok(match event.id() {
            Some(id) => id.clone(),
            None => self.mint("evt"),
        })
    }

    async fn delete_event(&self, event_id: &RecordId) -> Result<(), CoreError> {
        self.record(format!("delete_event:{event_id}"));
        Ok(())
    }

    async fn send_itinerary(
        &self,
        trip_id: &RecordId,
        _subject: &str,
        _body: &str,
    ) -> Result<String, CoreError> {
        self.record(format!("send_itinerary:{trip_id}"));
        Ok(self.email_status.lock().expect("status").clone())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notices").clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notices().into_iter().map(|notice| notice.title).collect()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().expect("notices").push(notice);
    }
}

pub struct PathNavigator;

impl Navigator for PathNavigator {
    fn url_for(&self, target: &NavTarget) -> String {
        match target {
            NavTarget::Record { id } => format!("/record/{id}"),
            NavTarget::ItineraryDocument { trip_id } => format!("/itinerary/{trip_id}"),
            NavTarget::TripPlanner { trip_id: Some(id) } => format!("/planner/{id}"),
            NavTarget::TripPlanner { trip_id: None } => "/planner".into(),
        }
    }
}

/// Finder backend serving a fixed constituent set.
pub struct FakeSearch {
    pub fields: Vec<FilterField>,
    pub columns: Vec<CatalogColumn>,
    pub rows: Vec<Row>,
    calls: Mutex<Vec<String>>,
    pub last_wrapper: Mutex<Option<FilterWrapper>>,
    pub last_page: Mutex<Option<PageRequest>>,
    pub saved: Mutex<Vec<SavedFilter>>,
    search_down: AtomicBool,
}

impl FakeSearch {
    pub fn new(fields: Vec<FilterField>, columns: Vec<CatalogColumn>, rows: Vec<Row>) -> Self {
        Self {
            fields,
            columns,
            rows,
            calls: Mutex::new(Vec::new()),
            last_wrapper: Mutex::new(None),
            last_page: Mutex::new(None),
            saved: Mutex::new(Vec::new()),
            search_down: AtomicBool::new(false),
        }
    }

    /// Makes every later `search` call fail.
    pub fn take_search_down(&self) {
        self.search_down.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls().iter().filter(|call| call.as_str() == name).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().expect("calls").push(call.into());
    }
}

#[async_trait]
impl ConstituentSearch for FakeSearch {
    async fn filter_fields(&self, _map_instance: &str) -> Result<Vec<FilterField>, CoreError> {
        self.record("filter_fields");
        Ok(self.fields.clone())
    }

    async fn table_columns(&self, _map_instance: &str) -> Result<Vec<CatalogColumn>, CoreError> {
        self.record("table_columns");
        Ok(self.columns.clone())
    }

    async fn column_catalog(&self, _map_instance: &str) -> Result<Vec<CatalogColumn>, CoreError> {
        self.record("column_catalog");
        Ok(self.columns.clone())
    }

    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>, CoreError> {
        self.record("geocode");
        Ok((!address.contains("nowhere")).then_some(Coordinates {
            latitude: 43.05,
            longitude: -75.4,
        }))
    }

    async fn search(
        &self,
        _map_instance: &str,
        _criteria: &SearchCriteria,
        page: &PageRequest,
    ) -> Result<SearchPage, CoreError> {
        self.record("search");
        if self.search_down.load(Ordering::SeqCst) {
            return Err(CoreError::Remote("search service unavailable".into()));
        }
        *self.last_page.lock().expect("page") = Some(page.clone());
        Ok(SearchPage {
            total_size: self.rows.len(),
            records: self
                .rows
                .iter()
                .skip(page.offset)
                .take(page.page_size)
                .cloned()
                .collect(),
        })
    }

    async fn export_rows(
        &self,
        _map_instance: &str,
        wrapper: &FilterWrapper,
        _request: &ExportRequest,
    ) -> Result<Vec<Row>, CoreError> {
        self.record("export_rows");
        *self.last_wrapper.lock().expect("wrapper") = Some(wrapper.clone());
        let ids = &wrapper.selection.record_ids;
        Ok(self
            .rows
            .iter()
            .filter(|row| {
                let listed = row.id().is_some_and(|id| ids.iter().any(|x| x == id));
                listed != wrapper.selection.export_all
            })
            .cloned()
            .collect())
    }

    async fn add_campaign_members(
        &self,
        _map_instance: &str,
        wrapper: &FilterWrapper,
        _campaign_id: &str,
    ) -> Result<(), CoreError> {
        self.record("add_campaign_members");
        *self.last_wrapper.lock().expect("wrapper") = Some(wrapper.clone());
        Ok(())
    }

    async fn save_filters(&self, _map_instance: &str, filters: &[SavedFilter]) -> Result<(), CoreError> {
        self.record("save_filters");
        self.saved.lock().expect("saved").extend_from_slice(filters);
        Ok(())
    }

    async fn load_saved_filter(
        &self,
        _map_instance: &str,
        owner: &str,
        key: &str,
    ) -> Result<Option<SavedFilter>, CoreError> {
        self.record("load_saved_filter");
        Ok(self
            .saved
            .lock()
            .expect("saved")
            .iter()
            .find(|filter| filter.owner == owner && filter.key == key)
            .cloned())
    }

    async fn delete_saved_filters(&self, _map_instance: &str, owner: &str) -> Result<(), CoreError> {
        self.record("delete_saved_filters");
        self.saved.lock().expect("saved").retain(|filter| filter.owner != owner);
        Ok(())
    }
}

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use portal_core::{CoreError, FetchQuery, RecordFetcher, TripStore, EMAIL_SENT_STATUS};
use portal_domain::{RecordId, Row, TripEvent, TripHeader};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

const DATA_EXTENSION: &str = "json";
const TRIPS_FILE: &str = "trips.json";
const TMP_SUFFIX: &str = "tmp";

/// Field a dataset row uses to reference its parent record.
pub const PARENT_FIELD: &str = "ParentId";

/// Filesystem-backed JSON persistence for list datasets and trips.
///
/// Datasets live in `<root>/<name>.json` as arrays of rows. Trips, their
/// itinerary events and the itinerary outbox share `<root>/trips.json`.
pub struct JsonRecordStore {
    root: PathBuf,
    trips_lock: Mutex<()>,
}

/// Everything persisted in `trips.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TripsFile {
    #[serde(default)]
    pub trips: Vec<TripHeader>,
    #[serde(default)]
    pub events: Vec<TripEvent>,
    #[serde(default)]
    pub outbox: Vec<OutboxEntry>,
}

/// An itinerary mail queued by [`TripStore::send_itinerary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub trip_id: RecordId,
    pub subject: String,
    pub body: String,
    pub queued_at: DateTime<Utc>,
}

impl JsonRecordStore {
    pub fn new(root: PathBuf) -> Result<Self, CoreError> {
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            trips_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_path(&self, name: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_name(name), DATA_EXTENSION))
    }

    pub fn trips_path(&self) -> PathBuf {
        self.root.join(TRIPS_FILE)
    }

    /// Dataset names available for fetching, sorted.
    pub fn list_datasets(&self) -> Result<Vec<String>, CoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() || path.file_name().and_then(|name| name.to_str()) == Some(TRIPS_FILE)
            {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(DATA_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn write_dataset(&self, name: &str, rows: &[Row]) -> Result<(), CoreError> {
        let path = self.dataset_path(name);
        save_json(&path, &rows)
    }

    pub fn load_dataset(&self, name: &str) -> Result<Vec<Row>, CoreError> {
        let path = self.dataset_path(name);
        if !path.exists() {
            return Err(CoreError::RecordNotFound(format!("dataset `{}`", name)));
        }
        load_json(&path)
    }

    pub fn list_trips(&self) -> Result<Vec<TripHeader>, CoreError> {
        let _guard = self.lock()?;
        let mut trips = self.read_trips()?.trips;
        trips.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
        Ok(trips)
    }

    pub fn outbox(&self) -> Result<Vec<OutboxEntry>, CoreError> {
        let _guard = self.lock()?;
        Ok(self.read_trips()?.outbox)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, CoreError> {
        self.trips_lock
            .lock()
            .map_err(|_| CoreError::Storage("trip store lock poisoned".into()))
    }

    fn read_trips(&self) -> Result<TripsFile, CoreError> {
        let path = self.trips_path();
        if path.exists() {
            load_json(&path)
        } else {
            Ok(TripsFile::default())
        }
    }

    fn write_trips(&self, file: &TripsFile) -> Result<(), CoreError> {
        save_json(&self.trips_path(), file)
    }

    /// Applies `change` to the trips file under the store lock and persists it.
    fn modify_trips<T>(
        &self,
        change: impl FnOnce(&mut TripsFile) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _guard = self.lock()?;
        let mut file = self.read_trips()?;
        let result = change(&mut file)?;
        self.write_trips(&file)?;
        Ok(result)
    }
}

#[async_trait]
impl RecordFetcher for JsonRecordStore {
    /// Rows of the named dataset, narrowed by `record_id` (matched against
    /// [`PARENT_FIELD`]) and by each param as an exact field match.
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Row>, CoreError> {
        let rows = self.load_dataset(&query.source)?;
        let rows: Vec<Row> = rows
            .into_iter()
            .filter(|row| match &query.record_id {
                Some(parent) => row.text(PARENT_FIELD).as_deref() == Some(parent.as_str()),
                None => true,
            })
            .filter(|row| {
                query
                    .params
                    .iter()
                    .all(|(field, value)| row.text(field).as_deref() == Some(value.as_str()))
            })
            .collect();
        debug!(source = %query.source, rows = rows.len(), "dataset fetched");
        Ok(rows)
    }
}

#[async_trait]
impl TripStore for JsonRecordStore {
    async fn load_trip(&self, trip_id: &RecordId) -> Result<TripHeader, CoreError> {
        let _guard = self.lock()?;
        self.read_trips()?
            .trips
            .into_iter()
            .find(|trip| trip.id.as_ref() == Some(trip_id))
            .ok_or_else(|| CoreError::RecordNotFound(format!("trip `{}`", trip_id)))
    }

    async fn load_events(&self, trip_id: &RecordId) -> Result<Vec<TripEvent>, CoreError> {
        let _guard = self.lock()?;
        let mut events: Vec<TripEvent> = self
            .read_trips()?
            .events
            .into_iter()
            .filter(|event| event.trip_id() == Some(trip_id))
            .collect();
        events.sort_by_key(|event| event.start());
        Ok(events)
    }

    async fn create_trip(&self, header: &TripHeader) -> Result<RecordId, CoreError> {
        let id = mint_id();
        let mut trip = header.clone();
        trip.id = Some(id.clone());
        self.modify_trips(|file| {
            file.trips.push(trip);
            Ok(())
        })?;
        info!(trip = %id, "trip created");
        Ok(id)
    }

    async fn update_trip(&self, header: &TripHeader) -> Result<RecordId, CoreError> {
        let id = header
            .id
            .clone()
            .ok_or_else(|| CoreError::InvalidOperation("cannot update an unsaved trip".into()))?;
        self.modify_trips(|file| {
            let existing = file
                .trips
                .iter_mut()
                .find(|trip| trip.id.as_ref() == Some(&id))
                .ok_or_else(|| CoreError::RecordNotFound(format!("trip `{}`", id)))?;
            *existing = header.clone();
            Ok(())
        })?;
        Ok(id)
    }

    async fn save_event(&self, event: &TripEvent) -> Result<RecordId, CoreError> {
        let trip_id = event
            .trip_id()
            .cloned()
            .ok_or_else(|| CoreError::InvalidOperation("event has no parent trip".into()))?;
        self.modify_trips(|file| {
            if !file.trips.iter().any(|trip| trip.id.as_ref() == Some(&trip_id)) {
                return Err(CoreError::RecordNotFound(format!("trip `{}`", trip_id)));
            }
            match event.id().cloned() {
                Some(id) => {
                    let existing = file
                        .events
                        .iter_mut()
                        .find(|stored| stored.id() == Some(&id))
                        .ok_or_else(|| CoreError::RecordNotFound(format!("event `{}`", id)))?;
                    *existing = event.clone();
                    Ok(id)
                }
                None => {
                    let id = mint_id();
                    let mut stored = event.clone();
                    stored.set_id(id.clone());
                    file.events.push(stored);
                    Ok(id)
                }
            }
        })
    }

    async fn delete_event(&self, event_id: &RecordId) -> Result<(), CoreError> {
        self.modify_trips(|file| {
            let before = file.events.len();
            file.events.retain(|event| event.id() != Some(event_id));
            if file.events.len() == before {
                return Err(CoreError::RecordNotFound(format!("event `{}`", event_id)));
            }
            Ok(())
        })
    }

    /// Queues the mail in the outbox; the store has no mail transport.
    async fn send_itinerary(
        &self,
        trip_id: &RecordId,
        subject: &str,
        body: &str,
    ) -> Result<String, CoreError> {
        self.modify_trips(|file| {
            if !file.trips.iter().any(|trip| trip.id.as_ref() == Some(trip_id)) {
                return Err(CoreError::RecordNotFound(format!("trip `{}`", trip_id)));
            }
            file.outbox.push(OutboxEntry {
                trip_id: trip_id.clone(),
                subject: subject.to_string(),
                body: body.to_string(),
                queued_at: Utc::now(),
            });
            Ok(())
        })?;
        info!(trip = %trip_id, "itinerary queued in outbox");
        Ok(EMAIL_SENT_STATUS.to_string())
    }
}

fn mint_id() -> RecordId {
    RecordId::new(Uuid::new_v4().to_string())
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "dataset".into()
    } else {
        sanitized
    }
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), CoreError> {
    let json =
        serde_json::to_string_pretty(value).map_err(|err| CoreError::Serde(err.to_string()))?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}

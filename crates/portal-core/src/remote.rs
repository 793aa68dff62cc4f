//! Collaborators the engines call out to: record fetching, trip
//! persistence, user notices and navigation.

use std::{collections::BTreeMap, fmt};

use async_trait::async_trait;
use portal_domain::{RecordId, Row, TripEvent, TripHeader};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Status string the itinerary mailer reports on success.
pub const EMAIL_SENT_STATUS: &str = "sent";

/// Names a data set plus the parameters a list passes when fetching it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchQuery {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl FetchQuery {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_record(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
pub trait RecordFetcher: Send + Sync {
    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<Row>, CoreError>;
}

/// Persistence for trips and their itinerary events.
#[async_trait]
pub trait TripStore: Send + Sync {
    async fn load_trip(&self, trip_id: &RecordId) -> Result<TripHeader, CoreError>;
    async fn load_events(&self, trip_id: &RecordId) -> Result<Vec<TripEvent>, CoreError>;
    async fn create_trip(&self, header: &TripHeader) -> Result<RecordId, CoreError>;
    async fn update_trip(&self, header: &TripHeader) -> Result<RecordId, CoreError>;
    /// Creates the event when it has no id, updates it otherwise.
    async fn save_event(&self, event: &TripEvent) -> Result<RecordId, CoreError>;
    async fn delete_event(&self, event_id: &RecordId) -> Result<(), CoreError>;
    /// Mails the itinerary and returns the mailer's raw status text.
    async fn send_itinerary(
        &self,
        trip_id: &RecordId,
        subject: &str,
        body: &str,
    ) -> Result<String, CoreError>;
}

/// Interpreted result of a remote call that reports a status string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteOutcome {
    Ok,
    Failed { reason: String },
}

impl RemoteOutcome {
    pub fn from_status(status: &str, expected: &str) -> Self {
        if status.trim().eq_ignore_ascii_case(expected) {
            RemoteOutcome::Ok
        } else {
            RemoteOutcome::Failed {
                reason: status.trim().to_string(),
            }
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, RemoteOutcome::Ok)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

/// A transient message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub severity: Severity,
    /// Stays visible until dismissed.
    #[serde(default)]
    pub sticky: bool,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
            sticky: false,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, message)
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Success, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, message)
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Destinations a component can link to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavTarget {
    Record { id: String },
    ItineraryDocument { trip_id: RecordId },
    TripPlanner { trip_id: Option<RecordId> },
}

pub trait Navigator: Send + Sync {
    fn url_for(&self, target: &NavTarget) -> String;
}

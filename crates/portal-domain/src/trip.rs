//! Domain models for trip itineraries: the trip header and its stays,
//! transports and meetings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::*;

/// Header record owning every itinerary event of a trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripHeader {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl TripHeader {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_window(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }
}

impl Persisted for TripHeader {
    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }
}

impl Displayable for TripHeader {
    fn display_label(&self) -> String {
        if self.title.trim().is_empty() {
            "Untitled trip".into()
        } else {
            self.title.clone()
        }
    }
}

/// Postal address attached to a meeting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl Address {
    /// Joins the non-empty parts with `", "`.
    pub fn display(&self) -> String {
        [
            &self.street,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// An accommodation booked during the trip.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StayDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<RecordId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Enumerates the travel modes offered by the transport form.
pub enum TransportMode {
    Car,
    Flight,
    Bus,
    Train,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Car,
        TransportMode::Flight,
        TransportMode::Bus,
        TransportMode::Train,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(value.trim()))
    }

    pub fn has_carrier_number(self) -> bool {
        matches!(self, TransportMode::Flight | TransportMode::Train)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportMode::Car => "Car",
            TransportMode::Flight => "Flight",
            TransportMode::Bus => "Bus",
            TransportMode::Train => "Train",
        };
        f.write_str(label)
    }
}

/// A leg of travel between two places.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransportDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<RecordId>,
    #[serde(default)]
    pub mode: Option<TransportMode>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub train_number: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
}

impl TransportDetails {
    /// Flight number for flights, train number for trains, nothing otherwise.
    pub fn carrier_number(&self) -> Option<&str> {
        match self.mode {
            Some(TransportMode::Flight) => self.flight_number.as_deref(),
            Some(TransportMode::Train) => self.train_number.as_deref(),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Lifecycle of a planned meeting with a constituent.
pub enum MeetingStatus {
    #[default]
    Planned,
    Scheduled,
    Rescheduled,
    Cancelled,
    #[serde(rename = "Attempted not Reachable")]
    AttemptedNotReachable,
    #[serde(rename = "Attempted not available")]
    AttemptedNotAvailable,
}

impl fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MeetingStatus::Planned => "Planned",
            MeetingStatus::Scheduled => "Scheduled",
            MeetingStatus::Rescheduled => "Rescheduled",
            MeetingStatus::Cancelled => "Cancelled",
            MeetingStatus::AttemptedNotReachable => "Attempted not Reachable",
            MeetingStatus::AttemptedNotAvailable => "Attempted not available",
        };
        f.write_str(label)
    }
}

/// A meeting with a constituent picked from the map finder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeetingDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_id: Option<RecordId>,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: MeetingStatus,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default)]
    pub address_text: Option<String>,
    /// Finder row the meeting was created from; not persisted by the store.
    #[serde(default, skip_serializing)]
    pub map_row_id: Option<String>,
}

impl MeetingDetails {
    pub fn for_contact(contact_id: impl Into<String>, contact_name: impl Into<String>) -> Self {
        Self {
            contact_id: Some(contact_id.into()),
            contact_name: Some(contact_name.into()),
            ..Self::default()
        }
    }

    /// Structured address when present, otherwise the stored free text.
    pub fn resolved_address(&self) -> Option<String> {
        let structured = self
            .address
            .as_ref()
            .map(Address::display)
            .filter(|text| !text.is_empty());
        structured.or_else(|| self.address_text.clone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Record type of an itinerary event.
pub enum EventKind {
    Accommodation,
    Transportation,
    Meeting,
}

impl EventKind {
    /// Name of the sub-form category shown in validation messages.
    pub fn form_label(self) -> &'static str {
        match self {
            EventKind::Accommodation => "stay details",
            EventKind::Transportation => "transport details",
            EventKind::Meeting => "meeting details",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Accommodation => "accommodation",
            EventKind::Transportation => "transportation",
            EventKind::Meeting => "meeting",
        };
        f.write_str(label)
    }
}

/// A persisted child of a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TripEvent {
    #[serde(rename = "accommodation")]
    Stay(StayDetails),
    #[serde(rename = "transportation")]
    Transport(TransportDetails),
    #[serde(rename = "meeting")]
    Meeting(MeetingDetails),
}

impl TripEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TripEvent::Stay(_) => EventKind::Accommodation,
            TripEvent::Transport(_) => EventKind::Transportation,
            TripEvent::Meeting(_) => EventKind::Meeting,
        }
    }

    pub fn id(&self) -> Option<&RecordId> {
        match self {
            TripEvent::Stay(stay) => stay.id.as_ref(),
            TripEvent::Transport(transport) => transport.id.as_ref(),
            TripEvent::Meeting(meeting) => meeting.id.as_ref(),
        }
    }

    pub fn set_id(&mut self, id: RecordId) {
        match self {
            TripEvent::Stay(stay) => stay.id = Some(id),
            TripEvent::Transport(transport) => transport.id = Some(id),
            TripEvent::Meeting(meeting) => meeting.id = Some(id),
        }
    }

    pub fn trip_id(&self) -> Option<&RecordId> {
        match self {
            TripEvent::Stay(stay) => stay.trip_id.as_ref(),
            TripEvent::Transport(transport) => transport.trip_id.as_ref(),
            TripEvent::Meeting(meeting) => meeting.trip_id.as_ref(),
        }
    }

    pub fn set_trip_id(&mut self, trip_id: RecordId) {
        match self {
            TripEvent::Stay(stay) => stay.trip_id = Some(trip_id),
            TripEvent::Transport(transport) => transport.trip_id = Some(trip_id),
            TripEvent::Meeting(meeting) => meeting.trip_id = Some(trip_id),
        }
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        match self {
            TripEvent::Stay(stay) => stay.start,
            TripEvent::Transport(transport) => transport.start,
            TripEvent::Meeting(meeting) => meeting.start,
        }
    }
}

impl Persisted for TripEvent {
    fn record_id(&self) -> Option<&RecordId> {
        self.id()
    }
}

impl Persisted for StayDetails {
    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }
}

impl Persisted for TransportDetails {
    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }
}

impl Persisted for MeetingDetails {
    fn record_id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }
}

impl Displayable for TripEvent {
    fn display_label(&self) -> String {
        match self {
            TripEvent::Stay(stay) => format!("Stay: {}", stay.name),
            TripEvent::Transport(transport) => match transport.mode {
                Some(mode) => format!("Transport: {mode}"),
                None => "Transport".into(),
            },
            TripEvent::Meeting(meeting) => format!(
                "Meeting: {} ({})",
                meeting.title,
                meeting.contact_name.as_deref().unwrap_or("unknown contact")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carrier_number_follows_mode() {
        let mut transport = TransportDetails {
            mode: Some(TransportMode::Flight),
            flight_number: Some("BA117".into()),
            train_number: Some("ICE 5".into()),
            ..TransportDetails::default()
        };
        assert_eq!(transport.carrier_number(), Some("BA117"));

        transport.mode = Some(TransportMode::Train);
        assert_eq!(transport.carrier_number(), Some("ICE 5"));

        transport.mode = Some(TransportMode::Car);
        assert_eq!(transport.carrier_number(), None);
    }

    #[test]
    fn meeting_address_prefers_structured_parts() {
        let mut meeting = MeetingDetails::for_contact("003", "Ada");
        meeting.address_text = Some("Old text".into());
        assert_eq!(meeting.resolved_address().as_deref(), Some("Old text"));

        meeting.address = Some(Address {
            street: Some("1 Main St".into()),
            city: Some("Clinton".into()),
            state: None,
            postal_code: Some(" ".into()),
            country: Some("US".into()),
        });
        assert_eq!(
            meeting.resolved_address().as_deref(),
            Some("1 Main St, Clinton, US")
        );
    }

    #[test]
    fn trip_event_round_trips_with_kind_tag() {
        let event = TripEvent::Stay(StayDetails {
            name: "Harbor Inn".into(),
            ..StayDetails::default()
        });
        let json = serde_json::to_value(&event).expect("serialize event");
        assert_eq!(json["kind"], "accommodation");

        let parsed: TripEvent = serde_json::from_value(json).expect("parse event");
        assert_eq!(parsed.kind(), EventKind::Accommodation);
        assert!(!parsed.is_saved());
    }

    #[test]
    fn meeting_status_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&MeetingStatus::AttemptedNotReachable).expect("status");
        assert_eq!(json, "\"Attempted not Reachable\"");
        assert_eq!(TransportMode::parse("flight"), Some(TransportMode::Flight));
    }
}

use std::sync::Arc;

use futures::future::join_all;
use portal_domain::{
    Address, EventKind, MeetingDetails, Persisted, RecordId, StayDetails, TransportDetails,
    TripEvent, TripHeader,
};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::{
    remote::{
        NavTarget, Navigator, Notice, Notifier, RemoteOutcome, TripStore, EMAIL_SENT_STATUS,
    },
    scope::ComponentScope,
    CoreError,
};

use super::{forms::FormList, step::WizardStep, validation::FormValidation};

/// Category named when the trip header itself is incomplete.
pub const TRIP_FORM_LABEL: &str = "trip details";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// A contact picked in the map finder, ready to become a meeting.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedContact {
    pub row_id: String,
    pub contact_id: String,
    pub name: String,
    pub address: Option<Address>,
}

/// Read-only snapshot shown on the preview tab.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub trip: TripHeader,
    pub stays: Vec<StayDetails>,
    pub transports: Vec<TransportDetails>,
    pub meetings: Vec<MeetingDetails>,
}

impl TripSummary {
    /// Every event ordered by start; undated events go last.
    pub fn timeline(&self) -> Vec<TripEvent> {
        let mut events: Vec<TripEvent> = self
            .stays
            .iter()
            .cloned()
            .map(TripEvent::Stay)
            .chain(self.transports.iter().cloned().map(TripEvent::Transport))
            .chain(self.meetings.iter().cloned().map(TripEvent::Meeting))
            .collect();
        events.sort_by_key(|event| (event.start().is_none(), event.start()));
        events
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildFailure {
    pub kind: EventKind,
    pub idx: usize,
    pub reason: String,
}

/// What a save actually achieved.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveReport {
    pub trip_id: Option<RecordId>,
    pub saved_children: usize,
    pub failures: Vec<ChildFailure>,
    pub email: Option<RemoteOutcome>,
    pub advanced_to: Option<WizardStep>,
}

impl SaveReport {
    fn advanced(trip_id: Option<RecordId>, step: WizardStep) -> Self {
        Self {
            trip_id,
            advanced_to: Some(step),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Multi-step trip planner: a trip header plus its stays, transports and
/// meetings, saved together and optionally mailed as an itinerary.
pub struct TripWizard {
    store: Arc<dyn TripStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    scope: ComponentScope,
    trip: TripHeader,
    stays: FormList<StayDetails>,
    transports: FormList<TransportDetails>,
    meetings: FormList<MeetingDetails>,
    active: WizardStep,
    email: EmailDraft,
    summary: Option<TripSummary>,
    preview_url: Option<String>,
    busy: bool,
}

impl TripWizard {
    pub fn new(
        store: Arc<dyn TripStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            notifier,
            navigator,
            scope: ComponentScope::new(),
            trip: TripHeader::default(),
            stays: FormList::single_blank(),
            transports: FormList::single_blank(),
            meetings: FormList::new(),
            active: WizardStep::default(),
            email: EmailDraft::default(),
            summary: None,
            preview_url: None,
            busy: false,
        }
    }

    /// Loads a trip and partitions its events into the three form lists.
    pub async fn load(&mut self, trip_id: RecordId) -> Result<(), CoreError> {
        let store = &self.store;
        let loaded = self
            .scope
            .run(async {
                let header = store.load_trip(&trip_id).await?;
                let events = store.load_events(&trip_id).await?;
                Ok((header, events))
            })
            .await;

        let (mut header, events) = match loaded {
            Ok(loaded) => loaded,
            Err(err) => {
                if !err.is_cancelled() {
                    error!(trip = %trip_id, error = %err, "trip load failed");
                    self.notifier
                        .notify(Notice::error("Unable to load trip", err.to_string()));
                }
                return Err(err);
            }
        };

        let (mut stays, mut transports, mut meetings) = (Vec::new(), Vec::new(), Vec::new());
        for event in events {
            match event {
                TripEvent::Stay(stay) => stays.push(stay),
                TripEvent::Transport(transport) => transports.push(transport),
                TripEvent::Meeting(meeting) => meetings.push(meeting),
            }
        }
        info!(
            trip = %trip_id,
            stays = stays.len(),
            transports = transports.len(),
            meetings = meetings.len(),
            "trip loaded"
        );

        header.id.get_or_insert(trip_id);
        self.trip = header;
        self.stays = non_empty_or_blank(stays);
        self.transports = non_empty_or_blank(transports);
        self.meetings = FormList::from_records(meetings);
        self.summary = None;
        self.preview_url = None;
        Ok(())
    }

    pub fn trip(&self) -> &TripHeader {
        &self.trip
    }

    pub fn trip_mut(&mut self) -> &mut TripHeader {
        &mut self.trip
    }

    pub fn stays(&self) -> &FormList<StayDetails> {
        &self.stays
    }

    pub fn stays_mut(&mut self) -> &mut FormList<StayDetails> {
        &mut self.stays
    }

    pub fn transports(&self) -> &FormList<TransportDetails> {
        &self.transports
    }

    pub fn transports_mut(&mut self) -> &mut FormList<TransportDetails> {
        &mut self.transports
    }

    pub fn meetings(&self) -> &FormList<MeetingDetails> {
        &self.meetings
    }

    pub fn meetings_mut(&mut self) -> &mut FormList<MeetingDetails> {
        &mut self.meetings
    }

    pub fn active_step(&self) -> WizardStep {
        self.active
    }

    pub fn email_mut(&mut self) -> &mut EmailDraft {
        &mut self.email
    }

    pub fn summary(&self) -> Option<&TripSummary> {
        self.summary.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn scope(&self) -> &ComponentScope {
        &self.scope
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }

    pub fn add_stay(&mut self) -> usize {
        self.stays.push(StayDetails {
            trip_id: self.trip.id.clone(),
            ..StayDetails::default()
        })
    }

    pub fn add_transport(&mut self) -> usize {
        self.transports.push(TransportDetails {
            trip_id: self.trip.id.clone(),
            ..TransportDetails::default()
        })
    }

    pub async fn remove_stay(&mut self, idx: usize) -> Result<(), CoreError> {
        remove_form(
            self.store.as_ref(),
            &self.scope,
            self.notifier.as_ref(),
            &mut self.stays,
            idx,
            EventKind::Accommodation,
        )
        .await
        .map(drop)
    }

    pub async fn remove_transport(&mut self, idx: usize) -> Result<(), CoreError> {
        remove_form(
            self.store.as_ref(),
            &self.scope,
            self.notifier.as_ref(),
            &mut self.transports,
            idx,
            EventKind::Transportation,
        )
        .await
        .map(drop)
    }

    /// Removes a meeting and returns the finder row it came from, so the
    /// caller can uncheck it.
    pub async fn remove_meeting(&mut self, idx: usize) -> Result<Option<String>, CoreError> {
        let removed = remove_form(
            self.store.as_ref(),
            &self.scope,
            self.notifier.as_ref(),
            &mut self.meetings,
            idx,
            EventKind::Meeting,
        )
        .await?;
        Ok(removed.and_then(|meeting| meeting.map_row_id))
    }

    /// Syncs meetings with the contacts currently selected in the finder.
    ///
    /// Unsaved meetings for deselected contacts are dropped; newly selected
    /// contacts get a fresh meeting, placed ahead of the existing ones.
    pub fn apply_contact_selection(&mut self, selected: &[SelectedContact]) {
        let is_selected = |contact: &Option<String>| {
            contact
                .as_deref()
                .is_some_and(|id| selected.iter().any(|pick| pick.contact_id == id))
        };
        self.meetings
            .retain(|meeting| meeting.is_saved() || is_selected(&meeting.contact_id));

        let fresh: Vec<MeetingDetails> = selected
            .iter()
            .filter(|pick| {
                !self
                    .meetings
                    .records()
                    .any(|meeting| meeting.contact_id.as_deref() == Some(pick.contact_id.as_str()))
            })
            .map(|pick| MeetingDetails {
                trip_id: self.trip.id.clone(),
                contact_id: Some(pick.contact_id.clone()),
                contact_name: Some(pick.name.clone()),
                address: pick.address.clone(),
                map_row_id: Some(pick.row_id.clone()),
                ..MeetingDetails::default()
            })
            .collect();
        debug!(added = fresh.len(), kept = self.meetings.len(), "meetings synced with selection");
        self.meetings.prepend(fresh);
    }

    /// Jumps to any tab without validation.
    pub fn select_tab(&mut self, step: WizardStep) {
        self.active = step;
        if step == WizardStep::Preview {
            self.summary = Some(self.build_summary());
            self.preview_url = self.trip.id.clone().map(|trip_id| {
                self.navigator
                    .url_for(&NavTarget::ItineraryDocument { trip_id })
            });
        }
    }

    pub fn build_summary(&self) -> TripSummary {
        TripSummary {
            trip: self.trip.clone(),
            stays: self.stays.iter().filter(|f| f.has_content()).map(|f| f.record.clone()).collect(),
            transports: self
                .transports
                .iter()
                .filter(|f| f.has_content())
                .map(|f| f.record.clone())
                .collect(),
            meetings: self
                .meetings
                .iter()
                .filter(|f| f.has_content())
                .map(|f| f.record.clone())
                .collect(),
        }
    }

    /// Saving meetings for later is pointless once every meeting has an id.
    pub fn can_save_meetings_for_later(&self) -> bool {
        self.meetings.records().any(|meeting| !meeting.is_saved())
    }

    /// "Save and Next". The contacts tab only selects people, so it moves
    /// on without persisting anything.
    pub async fn save_and_next(&mut self) -> Result<SaveReport, CoreError> {
        if self.active == WizardStep::StaysContacts {
            self.active = self.active.next();
            debug!("moved to meetings without saving");
            return Ok(SaveReport::advanced(self.trip.id.clone(), self.active));
        }
        self.save(false).await
    }

    /// Saves and mails the itinerary.
    pub async fn send(&mut self) -> Result<SaveReport, CoreError> {
        self.save(true).await
    }

    /// Validates, then persists the header followed by every included child
    /// concurrently, then optionally sends the itinerary.
    pub async fn save(&mut self, send_email: bool) -> Result<SaveReport, CoreError> {
        if let Some(category) = self.first_invalid_category() {
            let message = format!("Please fill in all required fields on the {category} form.");
            warn!(category, step = %self.active, "trip save blocked by validation");
            self.notifier.notify(Notice::error("Error", message.clone()));
            return Err(CoreError::Validation(message));
        }

        self.busy = true;
        let result = self.persist(send_email).await;
        self.busy = false;
        result
    }

    fn first_invalid_category(&self) -> Option<&'static str> {
        if !self.trip.is_valid() {
            return Some(TRIP_FORM_LABEL);
        }
        if self.stays.first_invalid().is_some() {
            return Some(EventKind::Accommodation.form_label());
        }
        if self.transports.first_invalid().is_some() {
            return Some(EventKind::Transportation.form_label());
        }
        if self.active.includes_meetings() && self.meetings.first_invalid().is_some() {
            return Some(EventKind::Meeting.form_label());
        }
        None
    }

    async fn persist(&mut self, send_email: bool) -> Result<SaveReport, CoreError> {
        let header_call = match self.trip.id {
            Some(_) => self.store.update_trip(&self.trip),
            None => self.store.create_trip(&self.trip),
        };
        let trip_id = match self.scope.run(header_call).await {
            Ok(trip_id) => trip_id,
            Err(err) => {
                if !err.is_cancelled() {
                    error!(error = %err, "trip header save failed");
                    self.notifier
                        .notify(Notice::error("Trip details NOT saved", err.to_string()));
                }
                return Err(err);
            }
        };
        self.trip.id = Some(trip_id.clone());

        let pending = self.pending_events(&trip_id);
        let store = &self.store;
        let results = self
            .scope
            .run(async {
                Ok(join_all(pending.iter().map(|(_, _, event)| store.save_event(event))).await)
            })
            .await?;

        let mut report = SaveReport {
            trip_id: Some(trip_id.clone()),
            ..SaveReport::default()
        };
        let attempted = pending.len();
        for ((kind, idx, _), result) in pending.into_iter().zip(results) {
            match result {
                Ok(event_id) => {
                    self.record_child_id(kind, idx, event_id, &trip_id);
                    report.saved_children += 1;
                }
                Err(err) => {
                    warn!(%kind, idx, error = %err, "itinerary entry not saved");
                    report.failures.push(ChildFailure {
                        kind,
                        idx,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if send_email {
            let outcome = match self
                .scope
                .run(self.store.send_itinerary(&trip_id, &self.email.subject, &self.email.body))
                .await
            {
                Ok(status) => RemoteOutcome::from_status(&status, EMAIL_SENT_STATUS),
                Err(CoreError::Cancelled) => return Err(CoreError::Cancelled),
                Err(err) => RemoteOutcome::Failed {
                    reason: err.to_string(),
                },
            };
            match &outcome {
                RemoteOutcome::Ok => {
                    info!(trip = %trip_id, "itinerary sent");
                    self.notifier
                        .notify(Notice::success("Success", "Itinerary email sent"));
                }
                RemoteOutcome::Failed { reason } => {
                    warn!(trip = %trip_id, reason = %reason, "itinerary not sent");
                    self.notifier.notify(Notice::error("Email NOT sent", reason.clone()));
                }
            }
            report.email = Some(outcome);
        }

        if !report.is_complete() {
            self.notifier.notify(
                Notice::warning(
                    "Trip partially saved",
                    format!(
                        "{} of {attempted} itinerary entries could not be saved.",
                        report.failures.len()
                    ),
                )
                .sticky(),
            );
            return Ok(report);
        }

        report.advanced_to = self.advance_after_save(&trip_id);
        info!(trip = %trip_id, children = report.saved_children, "trip saved");
        self.notifier
            .notify(Notice::success("Success", "Trip details saved"));
        Ok(report)
    }

    fn pending_events(&self, trip_id: &RecordId) -> Vec<(EventKind, usize, TripEvent)> {
        let mut pending = Vec::new();
        for form in self.stays.included() {
            pending.push((form.idx, TripEvent::Stay(form.record.clone())));
        }
        let stays = pending.len();
        for form in self.transports.included() {
            pending.push((form.idx, TripEvent::Transport(form.record.clone())));
        }
        if self.active.includes_meetings() {
            for form in self.meetings.included() {
                pending.push((form.idx, TripEvent::Meeting(form.record.clone())));
            }
        }
        debug!(stays, total = pending.len(), "itinerary entries queued for save");

        pending
            .into_iter()
            .map(|(idx, mut event)| {
                if event.trip_id().is_none() {
                    event.set_trip_id(trip_id.clone());
                }
                (event.kind(), idx, event)
            })
            .collect()
    }

    fn record_child_id(&mut self, kind: EventKind, idx: usize, event_id: RecordId, trip_id: &RecordId) {
        match kind {
            EventKind::Accommodation => {
                if let Some(stay) = self.stays.record_mut(idx) {
                    stay.id = Some(event_id);
                    stay.trip_id.get_or_insert_with(|| trip_id.clone());
                }
            }
            EventKind::Transportation => {
                if let Some(transport) = self.transports.record_mut(idx) {
                    transport.id = Some(event_id);
                    transport.trip_id.get_or_insert_with(|| trip_id.clone());
                }
            }
            EventKind::Meeting => {
                if let Some(meeting) = self.meetings.record_mut(idx) {
                    meeting.id = Some(event_id);
                    meeting.trip_id.get_or_insert_with(|| trip_id.clone());
                }
            }
        }
    }

    fn advance_after_save(&mut self, trip_id: &RecordId) -> Option<WizardStep> {
        match self.active {
            WizardStep::StaysContacts => None,
            WizardStep::Preview => {
                self.summary = Some(self.build_summary());
                self.preview_url = Some(self.navigator.url_for(&NavTarget::ItineraryDocument {
                    trip_id: trip_id.clone(),
                }));
                None
            }
            current => {
                self.active = current.next();
                if self.active == WizardStep::Preview {
                    self.summary = Some(self.build_summary());
                }
                Some(self.active)
            }
        }
    }
}

fn non_empty_or_blank<T>(records: Vec<T>) -> FormList<T>
where
    T: Persisted + FormValidation + Default,
{
    if records.is_empty() {
        FormList::single_blank()
    } else {
        FormList::from_records(records)
    }
}

/// Removes one form. Saved records are deleted remotely first; a failed
/// delete leaves the form in place.
async fn remove_form<T>(
    store: &dyn TripStore,
    scope: &ComponentScope,
    notifier: &dyn Notifier,
    forms: &mut FormList<T>,
    idx: usize,
    kind: EventKind,
) -> Result<Option<T>, CoreError>
where
    T: Persisted + FormValidation + Default,
{
    let Some(form) = forms.get(idx) else {
        return Err(CoreError::InvalidOperation(format!(
            "no {} form at position {idx}",
            kind.form_label()
        )));
    };
    if let Some(event_id) = form.record.record_id().cloned() {
        if let Err(err) = scope.run(store.delete_event(&event_id)).await {
            if !err.is_cancelled() {
                error!(%kind, event = %event_id, error = %err, "itinerary entry delete failed");
                notifier.notify(Notice::error("Unable to delete", err.to_string()));
            }
            return Err(err);
        }
        info!(%kind, event = %event_id, "itinerary entry deleted");
        notifier.notify(Notice::success("Deleted", "Itinerary entry deleted"));
    }
    Ok(forms.remove(idx))
}

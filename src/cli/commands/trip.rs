use std::{fs, path::PathBuf};

use chrono::{DateTime, Utc};
use clap::Subcommand;
use portal_core::{
    wizard::{FormList, FormValidation, TripSummary},
    TripWizard, WizardStep,
};
use portal_domain::{
    Displayable, MeetingDetails, Persisted, RecordId, StayDetails, TransportDetails, TripEvent,
    TripHeader,
};
use serde::Deserialize;

use crate::{
    cli::{
        output,
        ui::table_renderer::{Table, TableColumn},
        CliContext,
    },
    PortalError,
};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Subcommand)]
pub enum TripCommand {
    /// List saved trips
    List,

    /// Show a trip and its itinerary in date order
    Show {
        /// Trip id
        id: String,
    },

    /// Save a trip from a JSON draft, optionally mailing the itinerary
    Save {
        /// Draft file with `trip`, `stays`, `transports` and `meetings`
        draft: PathBuf,

        /// Mail the itinerary after saving
        #[arg(long)]
        send: bool,
    },

    /// Delete one itinerary entry from a trip
    RemoveEvent {
        /// Trip id
        trip_id: String,
        /// Event id
        event_id: String,
    },
}

/// A trip as written by hand. Entries with an id update the stored entry;
/// entries without one are created.
#[derive(Debug, Default, Deserialize)]
pub struct TripDraft {
    pub trip: TripHeader,
    #[serde(default)]
    pub stays: Vec<StayDetails>,
    #[serde(default)]
    pub transports: Vec<TransportDetails>,
    #[serde(default)]
    pub meetings: Vec<MeetingDetails>,
    #[serde(default)]
    pub email: Option<DraftEmail>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DraftEmail {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

pub async fn run(context: &CliContext, command: TripCommand) -> Result<(), PortalError> {
    match command {
        TripCommand::List => list_trips(context),
        TripCommand::Show { id } => show_trip(context, RecordId::new(id)).await,
        TripCommand::Save { draft, send } => {
            let data = fs::read_to_string(&draft)?;
            let draft: TripDraft = serde_json::from_str(&data)?;
            save_trip(context, draft, send).await
        }
        TripCommand::RemoveEvent { trip_id, event_id } => {
            remove_event(context, RecordId::new(trip_id), RecordId::new(event_id)).await
        }
    }
}

fn wizard(context: &CliContext) -> Result<TripWizard, PortalError> {
    Ok(TripWizard::new(
        context.store()?,
        context.notifier.clone(),
        context.navigator.clone(),
    ))
}

fn list_trips(context: &CliContext) -> Result<(), PortalError> {
    let trips = context.store()?.list_trips()?;
    if trips.is_empty() {
        output::info("No trips saved yet.");
        return Ok(());
    }

    let mut table = Table::new(vec![
        TableColumn::new("Id"),
        TableColumn::new("Trip"),
        TableColumn::new("Start"),
        TableColumn::new("End"),
    ]);
    for trip in &trips {
        table.add_row(vec![
            trip.id.as_ref().map(RecordId::to_string).unwrap_or_default(),
            trip.display_label(),
            format_moment(trip.start),
            format_moment(trip.end),
        ]);
    }
    output::section("Trips");
    println!("{}", table.render());
    Ok(())
}

async fn show_trip(context: &CliContext, trip_id: RecordId) -> Result<(), PortalError> {
    let mut wizard = wizard(context)?;
    wizard.load(trip_id).await?;
    wizard.select_tab(WizardStep::Preview);

    let summary = wizard.build_summary();
    print_summary(&summary);
    if let Some(url) = wizard.preview_url() {
        println!("Itinerary: {url}");
    }
    Ok(())
}

pub fn print_summary(summary: &TripSummary) {
    output::section(summary.trip.display_label());
    println!(
        "{} to {}",
        format_moment(summary.trip.start),
        format_moment(summary.trip.end)
    );

    let timeline = summary.timeline();
    if timeline.is_empty() {
        output::info("No itinerary entries.");
        return;
    }
    let mut table = Table::new(vec![
        TableColumn::new("Id"),
        TableColumn::new("Entry"),
        TableColumn::new("Start"),
        TableColumn::new("End"),
        TableColumn::new("Where"),
    ]);
    for event in &timeline {
        let (start, end) = event_window(event);
        table.add_row(vec![
            event.id().map(RecordId::to_string).unwrap_or_default(),
            event.display_label(),
            format_moment(start),
            format_moment(end),
            event_place(event).unwrap_or_default(),
        ]);
    }
    println!("{}", table.render());
}

async fn save_trip(context: &CliContext, draft: TripDraft, send: bool) -> Result<(), PortalError> {
    let mut wizard = wizard(context)?;
    if let Some(trip_id) = draft.trip.id.clone() {
        wizard.load(trip_id).await?;
    }

    let has_meetings = !draft.meetings.is_empty();
    *wizard.trip_mut() = draft.trip;
    merge_forms(wizard.stays_mut(), draft.stays);
    merge_forms(wizard.transports_mut(), draft.transports);
    merge_forms(wizard.meetings_mut(), draft.meetings);
    if let Some(email) = draft.email {
        let target = wizard.email_mut();
        target.subject = email.subject;
        target.body = email.body;
    }
    if has_meetings || send {
        wizard.select_tab(WizardStep::Meetings);
    }

    let report = wizard.save(send).await?;
    for failure in &report.failures {
        output::warning(format!(
            "{} #{} not saved: {}",
            failure.kind.form_label(),
            failure.idx + 1,
            failure.reason
        ));
    }
    if let Some(trip_id) = &report.trip_id {
        println!("Trip id: {trip_id}");
    }
    Ok(())
}

/// Replaces forms whose record shares an id with a draft entry and
/// appends the rest.
fn merge_forms<T>(forms: &mut FormList<T>, records: Vec<T>)
where
    T: Persisted + FormValidation + Default,
{
    for record in records {
        let existing = record.record_id().and_then(|id| {
            forms
                .iter()
                .find(|form| form.record.record_id() == Some(id))
                .map(|form| form.idx)
        });
        match existing.and_then(|idx| forms.record_mut(idx)) {
            Some(slot) => *slot = record,
            None => {
                forms.push(record);
            }
        }
    }
}

async fn remove_event(
    context: &CliContext,
    trip_id: RecordId,
    event_id: RecordId,
) -> Result<(), PortalError> {
    let mut wizard = wizard(context)?;
    wizard.load(trip_id.clone()).await?;

    if let Some(idx) = position(wizard.stays(), &event_id) {
        wizard.remove_stay(idx).await?;
    } else if let Some(idx) = position(wizard.transports(), &event_id) {
        wizard.remove_transport(idx).await?;
    } else if let Some(idx) = position(wizard.meetings(), &event_id) {
        wizard.remove_meeting(idx).await?;
    } else {
        return Err(PortalError::InvalidArgument(format!(
            "trip `{trip_id}` has no itinerary entry `{event_id}`"
        )));
    }
    Ok(())
}

fn position<T>(forms: &FormList<T>, id: &RecordId) -> Option<usize>
where
    T: Persisted + FormValidation + Default,
{
    forms
        .iter()
        .find(|form| form.record.record_id() == Some(id))
        .map(|form| form.idx)
}

fn event_window(event: &TripEvent) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match event {
        TripEvent::Stay(stay) => (stay.start, stay.end),
        TripEvent::Transport(transport) => (transport.start, transport.end),
        TripEvent::Meeting(meeting) => (meeting.start, meeting.end),
    }
}

fn event_place(event: &TripEvent) -> Option<String> {
    match event {
        TripEvent::Stay(stay) => stay.address.clone(),
        TripEvent::Transport(transport) => match (&transport.source, &transport.destination) {
            (Some(from), Some(to)) => Some(format!("{from} → {to}")),
            (Some(place), None) | (None, Some(place)) => Some(place.clone()),
            (None, None) => None,
        },
        TripEvent::Meeting(meeting) => meeting.resolved_address(),
    }
}

fn format_moment(moment: Option<DateTime<Utc>>) -> String {
    moment
        .map(|moment| moment.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "--".into())
}

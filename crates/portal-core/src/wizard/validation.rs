use chrono::{DateTime, Utc};
use portal_domain::{MeetingDetails, StayDetails, TransportDetails, TripHeader};

/// Required-field checks for one wizard form.
pub trait FormValidation {
    /// Human-readable problems; empty when the form can be saved.
    fn problems(&self) -> Vec<String>;

    /// Nothing entered yet. Blank unsaved forms are skipped on save.
    fn is_blank(&self) -> bool;

    fn is_valid(&self) -> bool {
        self.problems().is_empty()
    }
}

fn required_text(problems: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        problems.push(format!("{field} is required"));
    }
}

fn required<T>(problems: &mut Vec<String>, field: &str, value: &Option<T>) {
    if value.is_none() {
        problems.push(format!("{field} is required"));
    }
}

fn ordered_window(
    problems: &mut Vec<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) {
    if let (Some(start), Some(end)) = (start, end) {
        if end < start {
            problems.push("end must not be before start".into());
        }
    }
}

fn blank_text(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |text| text.trim().is_empty())
}

impl FormValidation for TripHeader {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        required_text(&mut problems, "title", &self.title);
        required(&mut problems, "start", &self.start);
        required(&mut problems, "end", &self.end);
        ordered_window(&mut problems, self.start, self.end);
        problems
    }

    fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.start.is_none() && self.end.is_none()
    }
}

impl FormValidation for StayDetails {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        required_text(&mut problems, "name", &self.name);
        required(&mut problems, "start", &self.start);
        required(&mut problems, "end", &self.end);
        ordered_window(&mut problems, self.start, self.end);
        problems
    }

    fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.start.is_none()
            && self.end.is_none()
            && blank_text(&self.address)
    }
}

impl FormValidation for TransportDetails {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        required(&mut problems, "mode", &self.mode);
        required(&mut problems, "start", &self.start);
        required(&mut problems, "end", &self.end);
        ordered_window(&mut problems, self.start, self.end);
        problems
    }

    fn is_blank(&self) -> bool {
        self.mode.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && blank_text(&self.flight_number)
            && blank_text(&self.train_number)
            && blank_text(&self.source)
            && blank_text(&self.destination)
    }
}

impl FormValidation for MeetingDetails {
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if blank_text(&self.contact_id) {
            problems.push("contact is required".into());
        }
        required_text(&mut problems, "title", &self.title);
        required(&mut problems, "start", &self.start);
        ordered_window(&mut problems, self.start, self.end);
        problems
    }

    // A meeting created from a contact selection is never blank.
    fn is_blank(&self) -> bool {
        blank_text(&self.contact_id)
            && self.title.trim().is_empty()
            && self.start.is_none()
            && self.end.is_none()
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tabs of the trip planner, in forward order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    #[default]
    #[serde(rename = "TD")]
    TripDetails,
    #[serde(rename = "SC")]
    StaysContacts,
    #[serde(rename = "SM")]
    Meetings,
    #[serde(rename = "PR")]
    Preview,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] = [
        WizardStep::TripDetails,
        WizardStep::StaysContacts,
        WizardStep::Meetings,
        WizardStep::Preview,
    ];

    pub fn code(self) -> &'static str {
        match self {
            WizardStep::TripDetails => "TD",
            WizardStep::StaysContacts => "SC",
            WizardStep::Meetings => "SM",
            WizardStep::Preview => "PR",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|step| step.code().eq_ignore_ascii_case(code.trim()))
    }

    /// Step reached by a successful "Save and Next"; Preview is terminal.
    pub fn next(self) -> Self {
        match self {
            WizardStep::TripDetails => WizardStep::StaysContacts,
            WizardStep::StaysContacts => WizardStep::Meetings,
            WizardStep::Meetings | WizardStep::Preview => WizardStep::Preview,
        }
    }

    /// Meeting forms are validated and saved only from these steps.
    pub fn includes_meetings(self) -> bool {
        matches!(self, WizardStep::Meetings | WizardStep::Preview)
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WizardStep::TripDetails => "Trip Details",
            WizardStep::StaysContacts => "Stays & Contacts",
            WizardStep::Meetings => "Meetings",
            WizardStep::Preview => "Preview",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_parse_codes_and_advance() {
        assert_eq!(WizardStep::parse("sm"), Some(WizardStep::Meetings));
        assert_eq!(WizardStep::parse("XX"), None);
        assert_eq!(WizardStep::TripDetails.next(), WizardStep::StaysContacts);
        assert_eq!(WizardStep::Preview.next(), WizardStep::Preview);
        assert!(!WizardStep::StaysContacts.includes_meetings());
        assert!(WizardStep::Preview.includes_meetings());
    }
}

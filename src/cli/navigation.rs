use portal_core::{NavTarget, Navigator};

/// Builds `portal://` links for a terminal session, where nothing can be
/// opened directly.
#[derive(Debug, Clone)]
pub struct LocalNavigator {
    scheme: String,
}

impl Default for LocalNavigator {
    fn default() -> Self {
        Self {
            scheme: "portal".into(),
        }
    }
}

impl Navigator for LocalNavigator {
    fn url_for(&self, target: &NavTarget) -> String {
        match target {
            NavTarget::Record { id } => format!("{}://records/{id}", self.scheme),
            NavTarget::ItineraryDocument { trip_id } => {
                format!("{}://trips/{trip_id}/itinerary", self.scheme)
            }
            NavTarget::TripPlanner { trip_id: Some(trip_id) } => {
                format!("{}://planner?trip={trip_id}", self.scheme)
            }
            NavTarget::TripPlanner { trip_id: None } => format!("{}://planner", self.scheme),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_domain::RecordId;

    #[test]
    fn builds_portal_links() {
        let nav = LocalNavigator::default();
        assert_eq!(
            nav.url_for(&NavTarget::ItineraryDocument {
                trip_id: RecordId::new("t1")
            }),
            "portal://trips/t1/itinerary"
        );
        assert_eq!(
            nav.url_for(&NavTarget::TripPlanner { trip_id: None }),
            "portal://planner"
        );
    }
}

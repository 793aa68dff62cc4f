use portal_domain::SelectionPayload;

/// Row selection over a server-paged result set.
///
/// While "select all" is on, the exclude list is authoritative; otherwise
/// the include list is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    all_selected: bool,
    included: Vec<String>,
    excluded: Vec<String>,
    total_size: usize,
}

impl SelectionState {
    pub fn new(total_size: usize) -> Self {
        Self {
            total_size,
            ..Self::default()
        }
    }

    pub fn set_total(&mut self, total_size: usize) {
        self.total_size = total_size;
    }

    pub fn set_row(&mut self, id: &str, checked: bool) {
        if checked {
            push_unique(&mut self.included, id);
            self.excluded.retain(|excluded| excluded != id);
        } else {
            push_unique(&mut self.excluded, id);
            self.included.retain(|included| included != id);
        }
        if self.all_selected && self.excluded.len() >= self.total_size {
            self.all_selected = false;
        }
    }

    /// Flips "select all" and returns the new state.
    pub fn toggle_all(&mut self) -> bool {
        self.all_selected = !self.all_selected;
        self.included.clear();
        if self.all_selected {
            self.excluded.clear();
        }
        self.all_selected
    }

    pub fn is_all_selected(&self) -> bool {
        self.all_selected
    }

    pub fn is_checked(&self, id: &str) -> bool {
        if self.all_selected {
            !self.excluded.iter().any(|excluded| excluded == id)
        } else {
            self.included.iter().any(|included| included == id)
        }
    }

    pub fn selected_count(&self) -> usize {
        if self.all_selected {
            self.total_size.saturating_sub(self.excluded.len())
        } else {
            self.included.len()
        }
    }

    /// Nothing would be exported or added to a campaign.
    pub fn is_empty(&self) -> bool {
        self.selected_count() == 0
    }

    pub fn included(&self) -> &[String] {
        &self.included
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    pub fn payload(&self) -> SelectionPayload {
        SelectionPayload {
            record_ids: if self.all_selected {
                self.excluded.clone()
            } else {
                self.included.clone()
            },
            export_all: self.all_selected,
        }
    }

    pub fn summary(&self) -> String {
        let count = self.selected_count();
        let noun = if count == 1 { "constituent" } else { "constituents" };
        format!("{count} {noun} selected to be exported.")
    }

    pub fn reset(&mut self) {
        self.all_selected = false;
        self.included.clear();
        self.excluded.clear();
    }
}

fn push_unique(ids: &mut Vec<String>, id: &str) {
    if !ids.iter().any(|existing| existing == id) {
        ids.push(id.to_string());
    }
}

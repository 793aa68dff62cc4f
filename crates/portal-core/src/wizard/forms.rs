use portal_domain::Persisted;
use serde::{Deserialize, Serialize};

use super::validation::FormValidation;

/// One editable entity in a wizard tab, addressed by its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubForm<T> {
    pub idx: usize,
    pub record: T,
    pub editable: bool,
}

impl<T: Persisted + FormValidation> SubForm<T> {
    /// Saved before, or holds user input.
    pub fn has_content(&self) -> bool {
        self.record.is_saved() || !self.record.is_blank()
    }

    /// Takes part in a save.
    pub fn is_included(&self) -> bool {
        self.editable && self.has_content()
    }
}

/// Ordered list of sub-forms whose indexes always equal their positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormList<T> {
    forms: Vec<SubForm<T>>,
}

impl<T> Default for FormList<T> {
    fn default() -> Self {
        Self { forms: Vec::new() }
    }
}

impl<T: Persisted + FormValidation + Default> FormList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = T>) -> Self {
        let mut list = Self::new();
        for record in records {
            list.push(record);
        }
        list
    }

    /// A list holding one blank form.
    pub fn single_blank() -> Self {
        Self::from_records([T::default()])
    }

    /// Appends an editable form and returns its index.
    pub fn push(&mut self, record: T) -> usize {
        let idx = self.forms.len();
        self.forms.push(SubForm {
            idx,
            record,
            editable: true,
        });
        idx
    }

    /// Inserts records ahead of the existing forms, keeping their order.
    pub fn prepend(&mut self, records: Vec<T>) {
        let mut forms: Vec<SubForm<T>> = records
            .into_iter()
            .map(|record| SubForm {
                idx: 0,
                record,
                editable: true,
            })
            .collect();
        forms.append(&mut self.forms);
        self.forms = forms;
        self.reindex();
    }

    /// Removes the form at `idx` without touching the store.
    pub fn remove(&mut self, idx: usize) -> Option<T> {
        if idx >= self.forms.len() {
            return None;
        }
        let removed = self.forms.remove(idx);
        self.reindex();
        Some(removed.record)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.forms.retain(|form| keep(&form.record));
        self.reindex();
    }

    pub fn get(&self, idx: usize) -> Option<&SubForm<T>> {
        self.forms.get(idx)
    }

    pub fn record_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.forms.get_mut(idx).map(|form| &mut form.record)
    }

    pub fn set_editable(&mut self, idx: usize, editable: bool) -> bool {
        match self.forms.get_mut(idx) {
            Some(form) => {
                form.editable = editable;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubForm<T>> {
        self.forms.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &T> {
        self.forms.iter().map(|form| &form.record)
    }

    pub fn included(&self) -> impl Iterator<Item = &SubForm<T>> {
        self.forms.iter().filter(|form| form.is_included())
    }

    /// First included form that would fail validation.
    pub fn first_invalid(&self) -> Option<&SubForm<T>> {
        self.included().find(|form| !form.record.is_valid())
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    fn reindex(&mut self) {
        for (position, form) in self.forms.iter_mut().enumerate() {
            form.idx = position;
        }
    }
}

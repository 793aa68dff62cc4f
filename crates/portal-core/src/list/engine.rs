use std::cmp::Ordering;

use portal_domain::{ColumnDescriptor, ColumnType, Row, SortDirection};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coerce::{sort_key, SortKey};

use super::predicate::FilterSet;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One link of a sort chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKeySpec {
    pub field: String,
    pub column_type: ColumnType,
    pub direction: SortDirection,
}

impl SortKeySpec {
    pub fn new(field: impl Into<String>, column_type: ColumnType, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            column_type,
            direction,
        }
    }
}

/// Static configuration of one list view.
#[derive(Debug, Clone, PartialEq)]
pub struct ListConfig {
    pub columns: Vec<ColumnDescriptor>,
    pub page_size: usize,
    pub default_sort: Option<(String, SortDirection)>,
    /// Keys compared, in order, when the primary sort key ties.
    pub tie_breakers: Vec<SortKeySpec>,
}

impl ListConfig {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            page_size: DEFAULT_PAGE_SIZE,
            default_sort: None,
            tie_breakers: Vec::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_default_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.default_sort = Some((field.into(), direction));
        self
    }

    pub fn with_tie_breaker(
        mut self,
        field: impl Into<String>,
        column_type: ColumnType,
        direction: SortDirection,
    ) -> Self {
        self.tie_breakers
            .push(SortKeySpec::new(field, column_type, direction));
        self
    }

    /// Finds a column by display field or sort field.
    pub fn column(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|column| column.field_name == field || column.sort_key() == field)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveSort {
    field: String,
    direction: SortDirection,
}

/// Client-side sort, pagination and filtering over one fetched record set.
///
/// The fetch cache is kept untouched so filters always evaluate against the
/// full set; `source` is the filtered, sorted view that pages are cut from.
#[derive(Debug, Clone)]
pub struct ListEngine {
    config: ListConfig,
    cache: Vec<Row>,
    source: Vec<Row>,
    page_size: usize,
    page_number: usize,
    sort: Option<ActiveSort>,
    filters: FilterSet,
}

impl ListEngine {
    pub fn new(config: ListConfig) -> Self {
        let sort = config
            .default_sort
            .as_ref()
            .map(|(field, direction)| ActiveSort {
                field: field.clone(),
                direction: *direction,
            });
        Self {
            page_size: config.page_size.max(1),
            config,
            cache: Vec::new(),
            source: Vec::new(),
            page_number: 1,
            sort,
            filters: FilterSet::default(),
        }
    }

    /// Replaces the record set wholesale, re-applying filter and sort.
    pub fn set_source(&mut self, rows: Vec<Row>) {
        self.cache = rows;
        self.rebuild();
        debug!(
            fetched = self.cache.len(),
            visible = self.source.len(),
            "list source replaced"
        );
    }

    /// Drops every row. Used when a fetch fails.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.source.clear();
        self.page_number = 1;
    }

    pub fn sort(&mut self, field: &str, direction: SortDirection) {
        self.sort = Some(ActiveSort {
            field: field.to_string(),
            direction,
        });
        self.rebuild();
        debug!(field, %direction, "list sorted");
    }

    /// Sorts by `field`, flipping the direction when it is already active.
    pub fn toggle_sort(&mut self, field: &str) -> SortDirection {
        let direction = match &self.sort {
            Some(active) if active.field == field => active.direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.sort(field, direction);
        direction
    }

    pub fn filter(&mut self, filters: FilterSet) {
        self.filters = filters;
        self.rebuild();
        debug!(visible = self.source.len(), "list filtered");
    }

    pub fn clear_filter(&mut self) {
        self.filter(FilterSet::default());
    }

    /// Moves to page `page`; out-of-range requests are ignored.
    pub fn set_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.page_number = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.set_page(self.page_number + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        match self.page_number.checked_sub(1) {
            Some(previous) => self.set_page(previous),
            None => false,
        }
    }

    pub fn first_page(&mut self) -> bool {
        self.set_page(1)
    }

    pub fn last_page(&mut self) -> bool {
        self.set_page(self.total_pages())
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_number = 1;
    }

    /// Rows of the current page.
    pub fn page(&self) -> &[Row] {
        let start = ((self.page_number - 1) * self.page_size).min(self.source.len());
        let end = (start + self.page_size).min(self.source.len());
        &self.source[start..end]
    }

    /// Every visible row in display order.
    pub fn rows(&self) -> &[Row] {
        &self.source
    }

    pub fn total_records(&self) -> usize {
        self.source.len()
    }

    pub fn total_pages(&self) -> usize {
        self.source.len().div_ceil(self.page_size).max(1)
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page_number >= self.total_pages()
    }

    pub fn show_pagination(&self) -> bool {
        self.source.len() > self.page_size
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort.as_ref().map(|active| active.field.as_str())
    }

    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.sort.as_ref().map(|active| active.direction)
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.config.columns
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    // The view is always derived from the cache, so equal keys keep fetch
    // order no matter how many sorts came before.
    fn rebuild(&mut self) {
        self.source = if self.filters.is_empty() {
            self.cache.clone()
        } else {
            self.cache
                .iter()
                .filter(|row| self.filters.matches(row))
                .cloned()
                .collect()
        };
        self.apply_sort();
        self.page_number = 1;
    }

    fn sort_chain(&self) -> Option<Vec<SortKeySpec>> {
        let active = self.sort.as_ref()?;
        let primary = match self.config.column(&active.field) {
            Some(column) => SortKeySpec::new(column.sort_key(), column.sort_type(), active.direction),
            None => SortKeySpec::new(active.field.clone(), ColumnType::Text, active.direction),
        };
        let mut chain = vec![primary];
        for breaker in &self.config.tie_breakers {
            if breaker.field != chain[0].field {
                chain.push(breaker.clone());
            }
        }
        Some(chain)
    }

    fn apply_sort(&mut self) {
        let Some(chain) = self.sort_chain() else {
            return;
        };
        let mut keyed: Vec<(Vec<SortKey>, Row)> = std::mem::take(&mut self.source)
            .into_iter()
            .map(|row| {
                let keys = chain
                    .iter()
                    .map(|spec| sort_key(row.get(&spec.field), spec.column_type))
                    .collect();
                (keys, row)
            })
            .collect();
        keyed.sort_by(|(left, _), (right, _)| compare_keys(left, right, &chain));
        self.source = keyed.into_iter().map(|(_, row)| row).collect();
    }
}

fn compare_keys(left: &[SortKey], right: &[SortKey], chain: &[SortKeySpec]) -> Ordering {
    left.iter()
        .zip(right)
        .zip(chain)
        .map(|((a, b), spec)| spec.direction.apply(a.compare(b)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

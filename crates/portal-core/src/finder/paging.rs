use portal_domain::{PageRequest, SortDirection};

pub const DEFAULT_FINDER_PAGE_SIZE: usize = 10;
pub const PAGE_SIZE_STEP: usize = 5;

/// Paging and ordering state for server-side result pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerPager {
    page_number: usize,
    page_size: usize,
    total_size: usize,
    sort_by: Option<String>,
    sort_direction: SortDirection,
}

impl Default for ServerPager {
    fn default() -> Self {
        Self::new(DEFAULT_FINDER_PAGE_SIZE)
    }
}

impl ServerPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_number: 1,
            page_size: page_size.max(DEFAULT_FINDER_PAGE_SIZE),
            total_size: 0,
            sort_by: None,
            sort_direction: SortDirection::Asc,
        }
    }

    pub fn offset(&self) -> usize {
        (self.page_number - 1) * self.page_size
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn set_total(&mut self, total_size: usize) {
        self.total_size = total_size;
        if self.page_number > self.total_pages() {
            self.page_number = self.total_pages();
        }
    }

    pub fn total_pages(&self) -> usize {
        self.total_size.div_ceil(self.page_size).max(1)
    }

    pub fn set_page(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.page_number = page;
        true
    }

    pub fn next(&mut self) -> bool {
        self.set_page(self.page_number + 1)
    }

    pub fn prev(&mut self) -> bool {
        match self.page_number.checked_sub(1) {
            Some(previous) => self.set_page(previous),
            None => false,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }

    pub fn is_last_page(&self) -> bool {
        self.page_number >= self.total_pages()
    }

    /// Shows five more rows per page while rows remain beyond one page.
    pub fn grow(&mut self) -> bool {
        if self.page_size >= self.total_size {
            return false;
        }
        self.page_size += PAGE_SIZE_STEP;
        self.page_number = 1;
        true
    }

    /// Shows five fewer rows per page, never fewer than ten.
    pub fn shrink(&mut self) -> bool {
        if self.page_size <= DEFAULT_FINDER_PAGE_SIZE {
            return false;
        }
        self.page_size = (self.page_size - PAGE_SIZE_STEP).max(DEFAULT_FINDER_PAGE_SIZE);
        self.page_number = 1;
        true
    }

    /// Sorts by `field`, flipping the direction when it is already active.
    pub fn sort_by(&mut self, field: &str) -> SortDirection {
        self.sort_direction = match self.sort_by.as_deref() {
            Some(current) if current == field => self.sort_direction.toggled(),
            _ => SortDirection::Asc,
        };
        self.sort_by = Some(field.to_string());
        self.page_number = 1;
        self.sort_direction
    }

    pub fn set_default_sort(&mut self, field: impl Into<String>) {
        if self.sort_by.is_none() {
            self.sort_by = Some(field.into());
        }
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_by.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn rewind(&mut self) {
        self.page_number = 1;
    }

    pub fn request(&self) -> PageRequest {
        PageRequest {
            offset: self.offset(),
            page_size: self.page_size,
            sort_by: self.sort_by.clone(),
            sort_direction: self.sort_direction,
        }
    }

    /// `Results: 11-20 of 42`.
    pub fn coverage_label(&self) -> String {
        if self.total_size == 0 {
            return "Results: 0-0 of 0".into();
        }
        let from = self.offset() + 1;
        let to = (self.offset() + self.page_size).min(self.total_size);
        format!("Results: {from}-{to} of {}", self.total_size)
    }

    /// `Page 2 of 5`.
    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.page_number, self.total_pages())
    }
}

use crate::query::{self, BrokenLinksFilter, DerivedPage, FilterSpec, SortDirection, SortKey, SortSpec};
use crate::{CrawlRecord, CrawlStatus};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Operator-controlled parameters that decide what subset of the store is shown.
///
/// Any filter or sort change resets the page to 1. Selection lives in
/// [`crate::SelectionTracker`] and is managed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    filter: FilterSpec,
    sort: SortSpec,
    page: usize,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            filter: FilterSpec::default(),
            sort: SortSpec::default(),
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Rebuild a view state from saved parts. The page is kept as-is and
    /// clamped when it is next derived.
    pub fn restore(filter: FilterSpec, sort: SortSpec, page: usize, page_size: usize) -> Self {
        Self {
            filter,
            sort,
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn sort(&self) -> SortSpec {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
        self.page = 1;
    }

    pub fn set_status_included(&mut self, status: CrawlStatus, included: bool) {
        if included {
            self.filter.statuses.insert(status);
        } else {
            self.filter.statuses.remove(&status);
        }
        self.page = 1;
    }

    pub fn set_broken_links_filter(&mut self, filter: BrokenLinksFilter) {
        self.filter.broken_links = filter;
        self.page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.filter = FilterSpec::default();
        self.page = 1;
    }

    /// Header-click behaviour: the active ascending column flips to
    /// descending, anything else starts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        let direction = if self.sort.key == key && self.sort.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.set_sort(SortSpec::new(key, direction));
    }

    pub fn set_sort(&mut self, sort: SortSpec) {
        self.sort = sort;
        self.page = 1;
    }

    /// Move to `page` clamped into `1..=total_pages`. Returns whether the
    /// page index actually changed.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) -> bool {
        let target = page.clamp(1, total_pages.max(1));
        if target == self.page {
            return false;
        }
        self.page = target;
        true
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    pub fn active_filter_count(&self) -> usize {
        self.filter.active_count()
    }

    pub fn has_active_filters(&self) -> bool {
        self.filter.is_active()
    }

    pub fn derive(&self, records: &[CrawlRecord]) -> DerivedPage {
        query::derive(records, &self.filter, self.sort, self.page, self.page_size)
    }
}

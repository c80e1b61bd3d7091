use crate::{BrokenLink, BrokenLinksFilter, CrawlStatus, RecordId, SortSpec};

/// Records per status across the whole store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusCounts {
    pub queued: usize,
    pub running: usize,
    pub completed: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn get(&self, status: CrawlStatus) -> usize {
        match status {
            CrawlStatus::Queued => self.queued,
            CrawlStatus::Running => self.running,
            CrawlStatus::Completed => self.completed,
            CrawlStatus::Error => self.error,
        }
    }

    pub(crate) fn increment(&mut self, status: CrawlStatus) {
        match status {
            CrawlStatus::Queued => self.queued += 1,
            CrawlStatus::Running => self.running += 1,
            CrawlStatus::Completed => self.completed += 1,
            CrawlStatus::Error => self.error += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.queued + self.running + self.completed + self.error
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub rows: Vec<RecordRowView>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_matching: usize,
    pub total_records: usize,
    pub start_item: usize,
    pub end_item: usize,
    pub search_term: String,
    pub status_filter: Vec<CrawlStatus>,
    pub broken_links_filter: BrokenLinksFilter,
    pub sort: SortSpec,
    pub active_filter_count: usize,
    pub selected: Vec<RecordId>,
    pub all_selected: bool,
    pub status_counts: StatusCounts,
    pub pending_requests: usize,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub health: Option<String>,
    pub detail: Option<RecordDetail>,
}

/// What the per-row crawl button offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlAction {
    Run,
    Rerun,
    /// Disabled while the crawl is in progress.
    Running,
}

impl CrawlAction {
    pub(crate) fn for_status(status: CrawlStatus) -> Self {
        match status {
            CrawlStatus::Running => CrawlAction::Running,
            CrawlStatus::Completed => CrawlAction::Rerun,
            CrawlStatus::Queued | CrawlStatus::Error => CrawlAction::Run,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CrawlAction::Run => "Run Crawler",
            CrawlAction::Rerun => "Rerun Crawler",
            CrawlAction::Running => "Running...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRowView {
    pub id: RecordId,
    pub url: String,
    pub title: String,
    pub html_version: String,
    pub internal_links: u32,
    pub external_links: u32,
    pub broken_links: u32,
    pub status: CrawlStatus,
    pub created_at: i64,
    pub selected: bool,
    pub crawl_action: CrawlAction,
}

/// Per-page analysis shown in the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDetail {
    pub id: RecordId,
    pub url: String,
    pub title: String,
    pub status: CrawlStatus,
    pub html_version: String,
    pub has_login_form: bool,
    /// Unix seconds as sent by the service.
    pub created_at: i64,
    pub created_at_millis: i64,
    pub total_links: u64,
    pub internal_links: u32,
    pub external_links: u32,
    pub broken_links: u32,
    /// `(level, count)` for h1..h6.
    pub headings: Vec<(u8, u32)>,
    pub broken_link_list: Vec<BrokenLink>,
}

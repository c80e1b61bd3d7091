use crate::{BatchId, BrokenLinksFilter, CrawlRecord, CrawlStatus, DashError, RecordId, SortKey, SortSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Operator asked for the authoritative list.
    RefreshRequested,
    /// Search box edited.
    SearchChanged(String),
    /// A status checkbox in the filter menu changed.
    StatusFilterToggled { status: CrawlStatus, included: bool },
    BrokenLinksFilterChanged(BrokenLinksFilter),
    FiltersCleared,
    /// Column header clicked.
    SortClicked(SortKey),
    /// Sort set explicitly (key and direction).
    SortChanged(SortSpec),
    /// Pagination control used.
    PageChanged(usize),
    /// Header checkbox: select or deselect the whole visible page.
    SelectAllToggled(bool),
    RecordToggled { id: RecordId, included: bool },
    SelectionCleared,
    /// Add-URL form submitted.
    UrlSubmitted(String),
    /// Run (or re-run) the crawler for one URL.
    CrawlRequested { url: String },
    /// Re-run several records, one after another.
    RerunRequested(Vec<RecordId>),
    RerunSelected,
    DeleteRequested(Vec<RecordId>),
    DeleteSelected,
    /// Open the detail view for a record.
    RecordOpened(RecordId),
    DetailClosed,
    HealthCheckRequested,
    /// Operator dismissed the error banner.
    ErrorDismissed,
    /// `GET /urls` settled.
    RecordsLoaded(Result<Vec<CrawlRecord>, DashError>),
    /// `POST /urls` settled.
    UrlAdded(Result<CrawlRecord, DashError>),
    /// `POST /urls/crawl` settled.
    CrawlFinished {
        id: Option<RecordId>,
        url: String,
        batch: Option<BatchId>,
        result: Result<CrawlRecord, DashError>,
    },
    /// A delete call settled.
    DeleteFinished {
        ids: Vec<RecordId>,
        result: Result<String, DashError>,
    },
    HealthChecked(Result<String, DashError>),
}

impl Msg {
    /// Completions answer an earlier [`crate::Effect`].
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Msg::RecordsLoaded(_)
                | Msg::UrlAdded(_)
                | Msg::CrawlFinished { .. }
                | Msg::DeleteFinished { .. }
                | Msg::HealthChecked(_)
        )
    }
}

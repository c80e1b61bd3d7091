use std::collections::{BTreeMap, VecDeque};

use crate::view_model::{AppViewModel, CrawlAction, RecordDetail, RecordRowView};
use crate::{
    DashError, DerivedPage, RecordId, RecordStore, SelectionTracker, ViewState,
};

pub type BatchId = u64;

/// A sequential re-run in progress.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct RerunBatch {
    pub(crate) remaining: VecDeque<RecordId>,
    pub(crate) processed: Vec<RecordId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) store: RecordStore,
    pub(crate) view: ViewState,
    pub(crate) selection: SelectionTracker,
    pub(crate) batches: BTreeMap<BatchId, RerunBatch>,
    next_batch_id: BatchId,
    pending_requests: usize,
    pub(crate) last_error: Option<DashError>,
    pub(crate) notice: Option<String>,
    pub(crate) health: Option<Result<String, DashError>>,
    pub(crate) detail: Option<RecordId>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(view: ViewState) -> Self {
        Self {
            view,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn view_state(&self) -> &ViewState {
        &self.view
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn last_error(&self) -> Option<&DashError> {
        self.last_error.as_ref()
    }

    pub fn health(&self) -> Option<&Result<String, DashError>> {
        self.health.as_ref()
    }

    /// Gateway calls issued but not yet settled.
    pub fn pending_requests(&self) -> usize {
        self.pending_requests
    }

    pub fn rerun_in_progress(&self) -> bool {
        !self.batches.is_empty()
    }

    /// Current page as derived from the store and view state.
    pub fn derived(&self) -> DerivedPage {
        self.view.derive(self.store.snapshot())
    }

    pub fn detail(&self) -> Option<RecordDetail> {
        let record = self.store.get(self.detail?)?;
        Some(RecordDetail {
            id: record.id,
            url: record.url.clone(),
            title: record.title.clone(),
            status: record.status,
            html_version: record.html_version.clone(),
            has_login_form: record.has_login_form,
            created_at: record.created_at,
            created_at_millis: record.created_at_millis(),
            total_links: record.total_links(),
            internal_links: record.internal_links,
            external_links: record.external_links,
            broken_links: record.broken_links,
            headings: record.headings.iter().collect(),
            broken_link_list: record.broken_link_list.clone(),
        })
    }

    pub fn view(&self) -> AppViewModel {
        let page = self.derived();
        let ids = page.visible_ids();
        let rows = page
            .visible
            .iter()
            .map(|record| RecordRowView {
                id: record.id,
                url: record.url.clone(),
                title: record.title.clone(),
                html_version: record.html_version.clone(),
                internal_links: record.internal_links,
                external_links: record.external_links,
                broken_links: record.broken_links,
                status: record.status,
                created_at: record.created_at,
                selected: self.selection.is_selected(record.id),
                crawl_action: CrawlAction::for_status(record.status),
            })
            .collect();
        let filter = self.view.filter();

        AppViewModel {
            rows,
            page: page.page,
            page_size: self.view.page_size(),
            total_pages: page.total_pages,
            total_matching: page.total_matching,
            total_records: self.store.len(),
            start_item: page.start_item,
            end_item: page.end_item,
            search_term: filter.search_term.clone(),
            status_filter: filter.statuses.iter().copied().collect(),
            broken_links_filter: filter.broken_links,
            sort: self.view.sort(),
            active_filter_count: self.view.active_filter_count(),
            selected: self.selection.in_page_order(&ids),
            all_selected: self.selection.is_all_selected(&ids),
            status_counts: self.store.status_counts(),
            pending_requests: self.pending_requests,
            error: self.last_error.as_ref().map(ToString::to_string),
            notice: self.notice.clone(),
            health: self.health.as_ref().map(|health| match health {
                Ok(status) => status.clone(),
                Err(err) => err.to_string(),
            }),
            detail: self.detail(),
        }
    }

    pub(crate) fn surface(&mut self, err: DashError) {
        self.last_error = Some(err);
    }

    pub(crate) fn allocate_batch(&mut self) -> BatchId {
        self.next_batch_id += 1;
        self.next_batch_id
    }

    pub(crate) fn requests_issued(&mut self, count: usize) {
        self.pending_requests += count;
    }

    pub(crate) fn request_settled(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
    }

    /// Keep selection and detail consistent with the freshly derived page.
    pub(crate) fn revalidate(&mut self) {
        let ids = self.derived().visible_ids();
        self.selection.retain_visible(&ids);
        if let Some(id) = self.detail {
            if !self.store.contains(id) {
                self.detail = None;
            }
        }
    }
}

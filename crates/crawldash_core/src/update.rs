use crawldash_logging::{dash_debug, dash_info, dash_warn};
use url::Url;

use crate::reconcile::{apply_optimistic, reconcile, Mutation, Settlement};
use crate::state::RerunBatch;
use crate::{AppState, BatchId, CrawlStatus, DashError, Effect, Msg, RecordId};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if msg.is_completion() {
        state.request_settled();
    }

    let effects = match msg {
        Msg::RefreshRequested => vec![Effect::FetchRecords],
        Msg::SearchChanged(term) => {
            state.view.set_search(term);
            Vec::new()
        }
        Msg::StatusFilterToggled { status, included } => {
            state.view.set_status_included(status, included);
            Vec::new()
        }
        Msg::BrokenLinksFilterChanged(filter) => {
            state.view.set_broken_links_filter(filter);
            Vec::new()
        }
        Msg::FiltersCleared => {
            state.view.clear_filters();
            Vec::new()
        }
        Msg::SortClicked(key) => {
            state.view.toggle_sort(key);
            Vec::new()
        }
        Msg::SortChanged(sort) => {
            state.view.set_sort(sort);
            Vec::new()
        }
        Msg::PageChanged(page) => {
            let total_pages = state.derived().total_pages;
            if state.view.go_to_page(page, total_pages) {
                // Ids on the new page no longer match what was selected.
                state.selection.clear();
            }
            Vec::new()
        }
        Msg::SelectAllToggled(true) => {
            let ids = state.derived().visible_ids();
            state.selection.select_all(&ids);
            Vec::new()
        }
        Msg::SelectAllToggled(false) | Msg::SelectionCleared => {
            state.selection.clear();
            Vec::new()
        }
        Msg::RecordToggled { id, included } => {
            if included && !state.derived().visible_ids().contains(&id) {
                dash_warn!("Ignoring selection of record {} outside the visible page", id);
            } else {
                state.selection.toggle(id, included);
            }
            Vec::new()
        }
        Msg::UrlSubmitted(raw) => match validate_url(&raw) {
            Ok(url) => {
                dash_info!("CreateUrl url={}", url);
                vec![Effect::CreateUrl { url }]
            }
            Err(err) => {
                dash_warn!("Rejected URL submission: {}", err);
                state.surface(err);
                Vec::new()
            }
        },
        Msg::CrawlRequested { url } => start_crawl(&mut state, &url),
        Msg::RerunRequested(ids) => start_rerun(&mut state, ids),
        Msg::RerunSelected => {
            let ids = selected_on_page(&state);
            start_rerun(&mut state, ids)
        }
        Msg::DeleteRequested(ids) => delete_effects(ids),
        Msg::DeleteSelected => delete_effects(selected_on_page(&state)),
        Msg::RecordOpened(id) => {
            if state.store.contains(id) {
                state.detail = Some(id);
            } else {
                dash_warn!("Cannot open record {}: not in the store", id);
                state.detail = None;
            }
            Vec::new()
        }
        Msg::DetailClosed => {
            state.detail = None;
            Vec::new()
        }
        Msg::HealthCheckRequested => vec![Effect::CheckHealth],
        Msg::ErrorDismissed => {
            state.last_error = None;
            Vec::new()
        }
        Msg::RecordsLoaded(result) => settle(&mut state, Settlement::Listed(result)),
        Msg::UrlAdded(result) => {
            let added = result.is_ok();
            let effects = settle(&mut state, Settlement::Created(result));
            if added {
                state.view.reset_page();
            }
            effects
        }
        Msg::CrawlFinished {
            id,
            url,
            batch: None,
            result,
        } => {
            dash_debug!("Crawl finished for {}", url);
            settle(&mut state, Settlement::Crawled { id, result })
        }
        Msg::CrawlFinished {
            id,
            url,
            batch: Some(batch_id),
            result,
        } => finish_batch_step(&mut state, batch_id, id, &url, result),
        Msg::DeleteFinished { ids, result } => {
            let deleted = result.is_ok();
            let effects = settle(&mut state, Settlement::Deleted { ids, result });
            if deleted {
                state.selection.clear();
                state.view.reset_page();
            }
            effects
        }
        Msg::HealthChecked(result) => {
            if let Err(err) = &result {
                state.surface(err.clone());
            }
            state.health = Some(result);
            Vec::new()
        }
    };

    state.requests_issued(effects.len());
    state.revalidate();
    (state, effects)
}

/// Trim and check a submitted URL: it must be an absolute http(s) URL.
pub fn validate_url(raw: &str) -> Result<String, DashError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DashError::validation("URL must not be empty"));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|err| DashError::validation(format!("invalid URL '{trimmed}': {err}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DashError::validation(format!(
            "unsupported URL scheme '{}' (expected http or https)",
            parsed.scheme()
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(DashError::validation(format!("URL '{trimmed}' has no host")));
    }
    Ok(trimmed.to_string())
}

/// Fold a settled call into state and issue the refresh it asks for.
fn settle(state: &mut AppState, settlement: Settlement) -> Vec<Effect> {
    if fold(state, settlement) {
        vec![Effect::FetchRecords]
    } else {
        Vec::new()
    }
}

/// Fold a settled call into state. Returns whether a full refresh is wanted.
fn fold(state: &mut AppState, settlement: Settlement) -> bool {
    let reconciled = reconcile(&mut state.store, settlement);
    if let Some(err) = reconciled.error {
        state.surface(err);
    }
    if let Some(notice) = reconciled.notice {
        state.notice = Some(notice);
    }
    reconciled.refresh
}

fn start_crawl(state: &mut AppState, raw_url: &str) -> Vec<Effect> {
    let url = raw_url.trim();
    if url.is_empty() {
        state.surface(DashError::validation("URL must not be empty"));
        return Vec::new();
    }

    let id = match state.store.find_by_url(url) {
        Some(record) if record.status == CrawlStatus::Running => {
            dash_debug!("Crawl for {} already running; ignoring", url);
            return Vec::new();
        }
        Some(record) => Some(record.id),
        None => None,
    };
    if let Some(id) = id {
        apply_optimistic(&mut state.store, &Mutation::BeginCrawl { id });
    }

    dash_info!("TriggerCrawl id={:?} url={}", id, url);
    vec![Effect::TriggerCrawl {
        id,
        url: url.to_string(),
        batch: None,
    }]
}

fn start_rerun(state: &mut AppState, ids: Vec<RecordId>) -> Vec<Effect> {
    let mut known: Vec<RecordId> = Vec::with_capacity(ids.len());
    for id in ids {
        if known.contains(&id) {
            continue;
        }
        if state.store.contains(id) {
            known.push(id);
        } else {
            dash_warn!("Skipping re-run of unknown record {}", id);
        }
    }
    if known.is_empty() {
        return Vec::new();
    }

    apply_optimistic(&mut state.store, &Mutation::Requeue { ids: known.clone() });
    let batch_id = state.allocate_batch();
    dash_info!("Re-run batch {} started for {} record(s)", batch_id, known.len());
    state.batches.insert(
        batch_id,
        RerunBatch {
            remaining: known.into(),
            processed: Vec::new(),
        },
    );
    advance_batch(state, batch_id)
}

/// Issue the next crawl of a batch, or the closing refresh once it is empty.
fn advance_batch(state: &mut AppState, batch_id: BatchId) -> Vec<Effect> {
    loop {
        let Some(batch) = state.batches.get_mut(&batch_id) else {
            return Vec::new();
        };
        let Some(id) = batch.remaining.pop_front() else {
            let processed = batch.processed.len();
            state.batches.remove(&batch_id);
            dash_info!("Re-run batch {} done ({} processed)", batch_id, processed);
            return vec![Effect::FetchRecords];
        };
        let Some(url) = state.store.get(id).map(|record| record.url.clone()) else {
            dash_warn!("Record {} vanished before its re-run was issued", id);
            continue;
        };
        apply_optimistic(&mut state.store, &Mutation::BeginCrawl { id });
        dash_info!("TriggerCrawl id={} url={} batch={}", id, url, batch_id);
        return vec![Effect::TriggerCrawl {
            id: Some(id),
            url,
            batch: Some(batch_id),
        }];
    }
}

fn finish_batch_step(
    state: &mut AppState,
    batch_id: BatchId,
    id: Option<RecordId>,
    url: &str,
    result: Result<crate::CrawlRecord, DashError>,
) -> Vec<Effect> {
    let succeeded = result.is_ok();
    // The batch issues a single refresh when it ends.
    fold(state, Settlement::Crawled { id, result });

    if succeeded {
        if let (Some(batch), Some(id)) = (state.batches.get_mut(&batch_id), id) {
            batch.processed.push(id);
        }
        return advance_batch(state, batch_id);
    }

    if let Some(batch) = state.batches.remove(&batch_id) {
        dash_warn!(
            "Re-run batch {} stopped at {}; {} processed, {} not issued",
            batch_id,
            url,
            batch.processed.len(),
            batch.remaining.len()
        );
    }
    vec![Effect::FetchRecords]
}

fn selected_on_page(state: &AppState) -> Vec<RecordId> {
    let ids = state.derived().visible_ids();
    state.selection.in_page_order(&ids)
}

fn delete_effects(ids: Vec<RecordId>) -> Vec<Effect> {
    let mut unique: Vec<RecordId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    match unique.as_slice() {
        [] => Vec::new(),
        [id] => {
            dash_info!("DeleteOne id={}", id);
            vec![Effect::DeleteOne { id: *id }]
        }
        _ => {
            dash_info!("DeleteMany ids={:?}", unique);
            vec![Effect::DeleteMany { ids: unique }]
        }
    }
}

//! Optimistic-then-reconcile bookkeeping for gateway operations.
//!
//! Every remote operation is a pair: [`apply_optimistic`] runs synchronously
//! when the call is issued, [`reconcile`] folds the settled result back into
//! the store. Reconciliation prefers a full refresh over patching.
use std::collections::BTreeSet;

use crawldash_logging::{dash_debug, dash_info, dash_warn};

use crate::{CrawlRecord, CrawlStatus, DashError, RecordId, RecordStore};

/// Local change applied before the remote call resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Show a record as being crawled.
    BeginCrawl { id: RecordId },
    /// Put records back to `queued` ahead of a re-run.
    Requeue { ids: Vec<RecordId> },
}

/// Settled result of a remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Created(Result<CrawlRecord, DashError>),
    Crawled {
        id: Option<RecordId>,
        result: Result<CrawlRecord, DashError>,
    },
    Deleted {
        ids: Vec<RecordId>,
        result: Result<String, DashError>,
    },
    Listed(Result<Vec<CrawlRecord>, DashError>),
}

/// What the caller still has to do after reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reconciled {
    /// The authoritative list should be re-fetched.
    pub refresh: bool,
    pub error: Option<DashError>,
    /// Informational message from the service, if any.
    pub notice: Option<String>,
}

/// Apply `mutation` to the store. Returns the ids whose status changed.
pub fn apply_optimistic(store: &mut RecordStore, mutation: &Mutation) -> Vec<RecordId> {
    match mutation {
        Mutation::BeginCrawl { id } => begin_crawl(store, *id).into_iter().collect(),
        Mutation::Requeue { ids } => ids
            .iter()
            .copied()
            .filter(|&id| match store.transition(id, CrawlStatus::Queued) {
                Ok(_) => true,
                Err(err) => {
                    dash_warn!("Requeue skipped: {}", err);
                    false
                }
            })
            .collect(),
    }
}

fn begin_crawl(store: &mut RecordStore, id: RecordId) -> Option<RecordId> {
    let current = store.get(id)?.status;
    // Re-running a finished record goes through `queued` first.
    if current != CrawlStatus::Queued {
        if let Err(err) = store.transition(id, CrawlStatus::Queued) {
            dash_warn!("BeginCrawl rejected: {}", err);
            return None;
        }
    }
    match store.transition(id, CrawlStatus::Running) {
        Ok(_) => {
            dash_debug!("Optimistic status running for record {}", id);
            Some(id)
        }
        Err(err) => {
            dash_warn!("BeginCrawl rejected: {}", err);
            None
        }
    }
}

/// Fold a settled remote result into the store.
pub fn reconcile(store: &mut RecordStore, settlement: Settlement) -> Reconciled {
    match settlement {
        Settlement::Created(Ok(record)) => {
            dash_info!("Record {} added for {}", record.id, record.url);
            store.upsert(record);
            Reconciled::default()
        }
        Settlement::Created(Err(err)) => failed(err),
        Settlement::Crawled { id, result: Ok(_) } => {
            dash_info!("Crawl settled for record {:?}; refreshing", id);
            Reconciled {
                refresh: true,
                ..Reconciled::default()
            }
        }
        Settlement::Crawled {
            id,
            result: Err(err),
        } => {
            if let Some(id) = id {
                mark_failed(store, id);
            }
            failed(err)
        }
        Settlement::Deleted {
            ids,
            result: Ok(message),
        } => {
            let ids: BTreeSet<RecordId> = ids.into_iter().collect();
            let removed = store.remove(&ids);
            dash_info!("Deleted {} record(s); refreshing", removed);
            Reconciled {
                refresh: true,
                error: None,
                notice: Some(message),
            }
        }
        Settlement::Deleted { result: Err(err), .. } => failed(err),
        Settlement::Listed(Ok(records)) => {
            dash_info!("Store replaced with {} record(s)", records.len());
            store.replace_all(records);
            Reconciled::default()
        }
        Settlement::Listed(Err(err)) => failed(err),
    }
}

fn mark_failed(store: &mut RecordStore, id: RecordId) {
    match store.get(id).map(|record| record.status) {
        Some(CrawlStatus::Running) => {
            if let Err(err) = store.transition(id, CrawlStatus::Error) {
                dash_warn!("Could not mark record {} failed: {}", id, err);
            }
        }
        // A refresh landed first; its data wins.
        Some(status) => dash_debug!("Record {} already {}, not marking error", id, status),
        None => dash_debug!("Record {} gone before crawl failure settled", id),
    }
}

fn failed(err: DashError) -> Reconciled {
    dash_warn!("Operation failed: {}", err);
    Reconciled {
        refresh: false,
        error: Some(err),
        notice: None,
    }
}

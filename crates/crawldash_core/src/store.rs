use std::collections::BTreeSet;

use thiserror::Error;

use crate::{CrawlRecord, CrawlStatus, RecordId, StatusCounts};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("record {0} is not in the store")]
    UnknownRecord(RecordId),
    #[error("record {id} cannot move from {from} to {to}")]
    Invalid {
        id: RecordId,
        from: CrawlStatus,
        to: CrawlStatus,
    },
}

/// Authoritative in-memory collection of crawl records, kept in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecordStore {
    records: Vec<CrawlRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole collection. Later duplicates of an id overwrite
    /// earlier ones in place so ids stay unique.
    pub fn replace_all(&mut self, records: Vec<CrawlRecord>) {
        self.records.clear();
        self.records.reserve(records.len());
        for record in records {
            self.upsert(record);
        }
    }

    /// Overwrite the record with the same id, or append it.
    pub fn upsert(&mut self, record: CrawlRecord) {
        match self.position(record.id) {
            Some(idx) => self.records[idx] = record,
            None => self.records.push(record),
        }
    }

    /// Remove every record whose id is in `ids`. Unknown ids are ignored.
    pub fn remove(&mut self, ids: &BTreeSet<RecordId>) -> usize {
        let before = self.records.len();
        self.records.retain(|record| !ids.contains(&record.id));
        before - self.records.len()
    }

    pub fn snapshot(&self) -> &[CrawlRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&CrawlRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn find_by_url(&self, url: &str) -> Option<&CrawlRecord> {
        self.records.iter().find(|record| record.url == url)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply a local status change, enforcing the record lifecycle.
    /// Returns the previous status.
    pub fn transition(
        &mut self,
        id: RecordId,
        next: CrawlStatus,
    ) -> Result<CrawlStatus, TransitionError> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(TransitionError::UnknownRecord(id))?;
        let from = record.status;
        if !from.can_transition_to(next) {
            return Err(TransitionError::Invalid { id, from, to: next });
        }
        record.status = next;
        Ok(from)
    }

    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for record in &self.records {
            counts.increment(record.status);
        }
        counts
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }
}

use crate::{BatchId, RecordId};

/// Gateway calls requested by [`crate::update`]. Each one settles as exactly
/// one completion [`crate::Msg`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `GET /urls`
    FetchRecords,
    /// `POST /urls`
    CreateUrl { url: String },
    /// `POST /urls/crawl`
    TriggerCrawl {
        id: Option<RecordId>,
        url: String,
        batch: Option<BatchId>,
    },
    /// `DELETE /urls/{id}`
    DeleteOne { id: RecordId },
    /// `DELETE /urls`
    DeleteMany { ids: Vec<RecordId> },
    /// `GET /health`
    CheckHealth,
}

//! Crawldash core: record store, query pipeline and the pure dashboard state machine.
mod effect;
mod error;
mod msg;
pub mod query;
mod reconcile;
mod record;
mod selection;
mod state;
mod store;
mod update;
mod view_model;
mod view_state;

pub use effect::Effect;
pub use error::DashError;
pub use msg::Msg;
pub use query::{
    derive, total_pages, BrokenLinksFilter, DerivedPage, FilterSpec, ParseViewError,
    SortDirection, SortKey, SortSpec,
};
pub use reconcile::{apply_optimistic, reconcile, Mutation, Reconciled, Settlement};
pub use record::{BrokenLink, CrawlRecord, CrawlStatus, HeadingCounts, ParseStatusError, RecordId};
pub use selection::SelectionTracker;
pub use state::{AppState, BatchId};
pub use store::{RecordStore, TransitionError};
pub use update::{update, validate_url};
pub use view_model::{AppViewModel, CrawlAction, RecordDetail, RecordRowView, StatusCounts};
pub use view_state::{ViewState, DEFAULT_PAGE_SIZE};

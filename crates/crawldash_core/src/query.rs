//! Filter -> sort -> paginate over a record snapshot.
//!
//! Everything here is a pure function of its inputs; the caller owns the
//! view state and the store.
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{CrawlRecord, CrawlStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrokenLinksFilter {
    #[default]
    All,
    HasBroken,
    NoBroken,
}

impl BrokenLinksFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            BrokenLinksFilter::All => "all",
            BrokenLinksFilter::HasBroken => "has-broken",
            BrokenLinksFilter::NoBroken => "no-broken",
        }
    }

    pub fn matches(self, broken_links: u32) -> bool {
        match self {
            BrokenLinksFilter::All => true,
            BrokenLinksFilter::HasBroken => broken_links > 0,
            BrokenLinksFilter::NoBroken => broken_links == 0,
        }
    }
}

impl fmt::Display for BrokenLinksFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseViewError {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for BrokenLinksFilter {
    type Err = ParseViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "all" => Ok(BrokenLinksFilter::All),
            "has-broken" => Ok(BrokenLinksFilter::HasBroken),
            "no-broken" => Ok(BrokenLinksFilter::NoBroken),
            other => Err(ParseViewError {
                kind: "broken-links filter",
                value: other.to_string(),
            }),
        }
    }
}

/// Predicates ANDed together to decide whether a record is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    pub search_term: String,
    /// Empty means every status passes.
    pub statuses: BTreeSet<CrawlStatus>,
    pub broken_links: BrokenLinksFilter,
}

impl FilterSpec {
    pub fn matches(&self, record: &CrawlRecord) -> bool {
        self.matches_search(record)
            && (self.statuses.is_empty() || self.statuses.contains(&record.status))
            && self.broken_links.matches(record.broken_links)
    }

    fn matches_search(&self, record: &CrawlRecord) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let needle = self.search_term.to_lowercase();
        record.url.to_lowercase().contains(&needle) || record.title.to_lowercase().contains(&needle)
    }

    pub fn active_count(&self) -> usize {
        self.statuses.len()
            + usize::from(self.broken_links != BrokenLinksFilter::All)
            + usize::from(!self.search_term.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.active_count() > 0
    }
}

/// Sortable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Url,
    Title,
    HtmlVersion,
    InternalLinks,
    ExternalLinks,
    BrokenLinks,
    Status,
    CreatedAt,
}

type Comparator = fn(&CrawlRecord, &CrawlRecord) -> Ordering;

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::Url,
        SortKey::Title,
        SortKey::HtmlVersion,
        SortKey::InternalLinks,
        SortKey::ExternalLinks,
        SortKey::BrokenLinks,
        SortKey::Status,
        SortKey::CreatedAt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Url => "url",
            SortKey::Title => "title",
            SortKey::HtmlVersion => "htmlVersion",
            SortKey::InternalLinks => "internalLinks",
            SortKey::ExternalLinks => "externalLinks",
            SortKey::BrokenLinks => "brokenLinks",
            SortKey::Status => "status",
            SortKey::CreatedAt => "createdAt",
        }
    }

    /// Ascending comparator for this column.
    ///
    /// `Status` compares the wire names, so ascending order is
    /// `completed < error < queued < running`.
    pub fn comparator(self) -> Comparator {
        match self {
            SortKey::Url => by_url,
            SortKey::Title => by_title,
            SortKey::HtmlVersion => by_html_version,
            SortKey::InternalLinks => by_internal_links,
            SortKey::ExternalLinks => by_external_links,
            SortKey::BrokenLinks => by_broken_links,
            SortKey::Status => by_status,
            SortKey::CreatedAt => by_created_at,
        }
    }
}

fn by_url(a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
    a.url.cmp(&b.url)
}

fn by_title(a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
    a.title.cmp(&b.title)
}

fn by_html_version(a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
    a.html_version.cmp(&b.html_version)
}

fn by_internal_links(a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
    a.internal_links.cmp(&b.internal_links)
}

fn by_external_links(a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
    a.external_links.cmp(&b.external_links)
}

fn by_broken_links(a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
    a.broken_links.cmp(&b.broken_links)
}

fn by_status(a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
    a.status.as_str().cmp(b.status.as_str())
}

fn by_created_at(a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
    a.created_at.cmp(&b.created_at)
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| ParseViewError {
                kind: "sort key",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = ParseViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(ParseViewError {
                kind: "sort direction",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    pub fn compare(&self, a: &CrawlRecord, b: &CrawlRecord) -> Ordering {
        let cmp = self.key.comparator();
        match self.direction {
            SortDirection::Asc => cmp(a, b),
            SortDirection::Desc => cmp(b, a),
        }
    }
}

impl Default for SortSpec {
    /// Newest first.
    fn default() -> Self {
        Self::new(SortKey::CreatedAt, SortDirection::Desc)
    }
}

/// One derived page of records plus the counts needed to render pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPage {
    pub visible: Vec<CrawlRecord>,
    pub total_matching: usize,
    pub total_pages: usize,
    pub page: usize,
    /// 1-indexed first item shown, 0 when the page is empty.
    pub start_item: usize,
    /// 1-indexed last item shown, 0 when the page is empty.
    pub end_item: usize,
}

impl DerivedPage {
    pub fn visible_ids(&self) -> Vec<crate::RecordId> {
        self.visible.iter().map(|record| record.id).collect()
    }
}

/// `ceil(total_matching / page_size)`, never less than 1.
pub fn total_pages(total_matching: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_matching.div_ceil(page_size).max(1)
}

/// Filter, stable-sort and slice `records` for the 1-indexed `page`.
pub fn derive(
    records: &[CrawlRecord],
    filter: &FilterSpec,
    sort: SortSpec,
    page: usize,
    page_size: usize,
) -> DerivedPage {
    debug_assert!(page_size > 0, "page size must be positive");
    let page_size = page_size.max(1);
    let page = page.max(1);

    let mut matching: Vec<&CrawlRecord> = records
        .iter()
        .filter(|record| filter.matches(record))
        .collect();
    // `sort_by` is stable: ties keep snapshot order.
    matching.sort_by(|a, b| sort.compare(a, b));

    let total_matching = matching.len();
    let start = (page - 1).saturating_mul(page_size).min(total_matching);
    let end = start.saturating_add(page_size).min(total_matching);
    let visible: Vec<CrawlRecord> = matching[start..end].iter().map(|&r| r.clone()).collect();

    let (start_item, end_item) = if visible.is_empty() {
        (0, 0)
    } else {
        (start + 1, end)
    };

    DerivedPage {
        visible,
        total_matching,
        total_pages: total_pages(total_matching, page_size),
        page,
        start_item,
        end_item,
    }
}

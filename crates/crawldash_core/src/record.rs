use std::fmt;
use std::str::FromStr;

use thiserror::Error;

pub type RecordId = u64;

/// Lifecycle of a crawl record as reported by the crawler service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CrawlStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Error,
}

impl CrawlStatus {
    pub const ALL: [CrawlStatus; 4] = [
        CrawlStatus::Queued,
        CrawlStatus::Running,
        CrawlStatus::Completed,
        CrawlStatus::Error,
    ];

    /// Wire identifier, also used as the sort key for status columns.
    pub fn as_str(self) -> &'static str {
        match self {
            CrawlStatus::Queued => "queued",
            CrawlStatus::Running => "running",
            CrawlStatus::Completed => "completed",
            CrawlStatus::Error => "error",
        }
    }

    /// Valid local transitions: `queued -> running -> {completed, error}`,
    /// and any state back to `queued`.
    pub fn can_transition_to(self, next: CrawlStatus) -> bool {
        matches!(
            (self, next),
            (_, CrawlStatus::Queued)
                | (CrawlStatus::Queued, CrawlStatus::Running)
                | (CrawlStatus::Running, CrawlStatus::Completed)
                | (CrawlStatus::Running, CrawlStatus::Error)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CrawlStatus::Completed | CrawlStatus::Error)
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown crawl status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for CrawlStatus {
    type Err = ParseStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        CrawlStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseStatusError(value.to_string()))
    }
}

/// Per-level heading counts (`h1` through `h6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeadingCounts([u32; 6]);

impl HeadingCounts {
    pub const LEVELS: std::ops::RangeInclusive<u8> = 1..=6;

    pub fn new(counts: [u32; 6]) -> Self {
        Self(counts)
    }

    /// Count for heading `level` (1..=6); `None` outside that range.
    pub fn get(&self, level: u8) -> Option<u32> {
        let idx = usize::from(level).checked_sub(1)?;
        self.0.get(idx).copied()
    }

    pub fn set(&mut self, level: u8, count: u32) -> bool {
        let Some(slot) = usize::from(level)
            .checked_sub(1)
            .and_then(|idx| self.0.get_mut(idx))
        else {
            return false;
        };
        *slot = count;
        true
    }

    /// `(level, count)` pairs in level order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u32)> + '_ {
        Self::LEVELS.zip(self.0.iter().copied())
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|&count| u64::from(count)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenLink {
    pub id: u64,
    pub crawl_result_id: RecordId,
    pub url: String,
    pub status_code: i32,
}

/// One tracked URL and its latest analysis outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRecord {
    pub id: RecordId,
    pub url: String,
    pub title: String,
    pub html_version: String,
    pub headings: HeadingCounts,
    pub internal_links: u32,
    pub external_links: u32,
    pub broken_links: u32,
    pub has_login_form: bool,
    pub broken_link_list: Vec<BrokenLink>,
    /// Unix seconds.
    pub created_at: i64,
    pub status: CrawlStatus,
}

impl CrawlRecord {
    /// A freshly submitted record with no analysis data yet.
    pub fn queued(id: RecordId, url: impl Into<String>, created_at: i64) -> Self {
        Self {
            id,
            url: url.into(),
            title: String::new(),
            html_version: String::new(),
            headings: HeadingCounts::default(),
            internal_links: 0,
            external_links: 0,
            broken_links: 0,
            has_login_form: false,
            broken_link_list: Vec::new(),
            created_at,
            status: CrawlStatus::Queued,
        }
    }

    /// `created_at` scaled for millisecond-based date types.
    pub fn created_at_millis(&self) -> i64 {
        self.created_at.saturating_mul(1000)
    }

    pub fn total_links(&self) -> u64 {
        u64::from(self.internal_links) + u64::from(self.external_links)
    }

    /// Broken-link count and list only have to agree once the crawl completed.
    pub fn broken_links_consistent(&self) -> bool {
        self.status != CrawlStatus::Completed
            || self.broken_link_list.len() == self.broken_links as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_pipeline_or_requeue() {
        use CrawlStatus::*;
        assert!(Queued.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Error));
        for status in CrawlStatus::ALL {
            assert!(status.can_transition_to(Queued));
        }
        assert!(!Completed.can_transition_to(Running));
        assert!(!Queued.can_transition_to(Completed));
        assert!(!Error.can_transition_to(Completed));
    }

    #[test]
    fn heading_levels_are_one_based() {
        let mut headings = HeadingCounts::new([1, 2, 3, 4, 5, 6]);
        assert_eq!(headings.get(1), Some(1));
        assert_eq!(headings.get(6), Some(6));
        assert_eq!(headings.get(0), None);
        assert_eq!(headings.get(7), None);
        assert!(headings.set(3, 30));
        assert!(!headings.set(9, 1));
        assert_eq!(headings.total(), 1 + 2 + 30 + 4 + 5 + 6);
        assert_eq!(headings.iter().next(), Some((1, 1)));
    }

    #[test]
    fn status_parses_wire_names() {
        assert_eq!("completed".parse(), Ok(CrawlStatus::Completed));
        assert_eq!("Running".parse(), Ok(CrawlStatus::Running));
        assert!("done".parse::<CrawlStatus>().is_err());
    }
}

//! JSON shapes exchanged with the crawler service.
use crawldash_core::{BrokenLink, CrawlRecord, CrawlStatus, HeadingCounts, RecordId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum WireStatus {
    #[default]
    Queued,
    Running,
    Completed,
    Error,
}

impl From<WireStatus> for CrawlStatus {
    fn from(status: WireStatus) -> Self {
        match status {
            WireStatus::Queued => CrawlStatus::Queued,
            WireStatus::Running => CrawlStatus::Running,
            WireStatus::Completed => CrawlStatus::Completed,
            WireStatus::Error => CrawlStatus::Error,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct WireBrokenLink {
    id: u64,
    crawl_result_id: RecordId,
    url: String,
    status_code: i32,
}

/// The crawl response omits fields the service fills in later, so
/// everything defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct WireCrawlRecord {
    id: RecordId,
    url: String,
    title: String,
    html_version: String,
    h1_count: u32,
    h2_count: u32,
    h3_count: u32,
    h4_count: u32,
    h5_count: u32,
    h6_count: u32,
    internal_links: u32,
    external_links: u32,
    broken_links: u32,
    has_login_form: bool,
    broken_link_list: Option<Vec<WireBrokenLink>>,
    created_at: i64,
    status: WireStatus,
}

impl From<WireCrawlRecord> for CrawlRecord {
    fn from(wire: WireCrawlRecord) -> Self {
        CrawlRecord {
            id: wire.id,
            url: wire.url,
            title: wire.title,
            html_version: wire.html_version,
            headings: HeadingCounts::new([
                wire.h1_count,
                wire.h2_count,
                wire.h3_count,
                wire.h4_count,
                wire.h5_count,
                wire.h6_count,
            ]),
            internal_links: wire.internal_links,
            external_links: wire.external_links,
            broken_links: wire.broken_links,
            has_login_form: wire.has_login_form,
            broken_link_list: wire
                .broken_link_list
                .unwrap_or_default()
                .into_iter()
                .map(|link| BrokenLink {
                    id: link.id,
                    crawl_result_id: link.crawl_result_id,
                    url: link.url,
                    status_code: link.status_code,
                })
                .collect(),
            created_at: wire.created_at,
            status: wire.status.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireError {
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    pub(crate) details: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireMessage {
    #[serde(default)]
    pub(crate) message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct WireHealth {
    #[serde(default)]
    pub(crate) status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct UrlRequest<'a> {
    pub(crate) url: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct IdsRequest<'a> {
    pub(crate) ids: &'a [RecordId],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crawl_response_without_id_or_status_still_decodes() {
        let wire: WireCrawlRecord = serde_json::from_str(
            r#"{"url":"https://a.example","title":"A","h2Count":3,"brokenLinks":1,
                "brokenLinkList":[{"url":"https://a.example/x","statusCode":404}]}"#,
        )
        .unwrap();
        let record = CrawlRecord::from(wire);
        assert_eq!(record.id, 0);
        assert_eq!(record.status, CrawlStatus::Queued);
        assert_eq!(record.headings.get(2), Some(3));
        assert_eq!(record.broken_link_list.len(), 1);
        assert_eq!(record.broken_link_list[0].status_code, 404);
    }

    #[test]
    fn null_broken_link_list_is_empty() {
        let wire: WireCrawlRecord =
            serde_json::from_str(r#"{"id":4,"status":"error","brokenLinkList":null}"#).unwrap();
        let record = CrawlRecord::from(wire);
        assert!(record.broken_link_list.is_empty());
        assert_eq!(record.status, CrawlStatus::Error);
    }
}

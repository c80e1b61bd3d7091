use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, Once};

use crawldash_core::{AppState, CrawlRecord, CrawlStatus, DashError, Msg, RecordId};
use crawldash_gateway::{CrawlerGateway, Dashboard};
use pretty_assertions::assert_eq;
use tokio::sync::Notify;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(crawldash_logging::initialize_for_tests);
}

/// In-memory crawler service that records every call it receives.
#[derive(Default)]
struct FakeGateway {
    records: Mutex<Vec<CrawlRecord>>,
    calls: Mutex<Vec<String>>,
    failing_urls: BTreeSet<String>,
    /// Crawls of these urls wait until notified.
    gates: HashMap<String, Arc<Notify>>,
}

impl FakeGateway {
    fn with_records(records: Vec<CrawlRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    fn failing(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    fn gated(mut self, url: &str, gate: Arc<Notify>) -> Self {
        self.gates.insert(url.to_string(), gate);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl CrawlerGateway for FakeGateway {
    async fn list(&self) -> Result<Vec<CrawlRecord>, DashError> {
        self.log("list".to_string());
        Ok(self.records.lock().unwrap().clone())
    }

    async fn add(&self, url: &str) -> Result<CrawlRecord, DashError> {
        self.log(format!("add {url}"));
        let mut records = self.records.lock().unwrap();
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let record = CrawlRecord::queued(id, url, 1_800_000_000);
        records.push(record.clone());
        Ok(record)
    }

    async fn crawl(&self, url: &str) -> Result<CrawlRecord, DashError> {
        self.log(format!("crawl {url}"));
        if let Some(gate) = self.gates.get(url) {
            gate.notified().await;
        }
        if self.failing_urls.contains(url) {
            let mut records = self.records.lock().unwrap();
            if let Some(record) = records.iter_mut().find(|r| r.url == url) {
                record.status = CrawlStatus::Error;
            }
            return Err(DashError::remote(500, "Failed to crawl URL", None));
        }
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.url == url)
            .ok_or_else(|| DashError::remote(404, "URL not found in database", None))?;
        record.status = CrawlStatus::Completed;
        record.title = format!("Title of {url}");
        Ok(record.clone())
    }

    async fn delete_one(&self, id: RecordId) -> Result<String, DashError> {
        self.log(format!("delete {id}"));
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok("URL and associated data deleted successfully".to_string())
    }

    async fn delete_many(&self, ids: &[RecordId]) -> Result<String, DashError> {
        self.log(format!("delete {ids:?}"));
        self.records.lock().unwrap().retain(|r| !ids.contains(&r.id));
        Ok("URLs and associated data deleted successfully".to_string())
    }

    async fn health(&self) -> Result<String, DashError> {
        self.log("health".to_string());
        Ok("ok".to_string())
    }
}

fn completed(id: RecordId, url: &str) -> CrawlRecord {
    CrawlRecord {
        status: CrawlStatus::Completed,
        ..CrawlRecord::queued(id, url, 1_700_000_000 + id as i64)
    }
}

async fn loaded(gateway: Arc<FakeGateway>) -> Dashboard {
    let mut dashboard = Dashboard::new(gateway, AppState::new());
    dashboard.run(Msg::RefreshRequested).await;
    dashboard
}

fn status_of(dashboard: &Dashboard, id: RecordId) -> CrawlStatus {
    dashboard.state().store().get(id).expect("record").status
}

#[tokio::test]
async fn crawl_is_running_while_in_flight_and_error_after_failure() {
    init_logging();
    let gateway = Arc::new(FakeGateway::with_records(vec![completed(1, "a.com")]).failing("a.com"));
    let mut dashboard = loaded(gateway.clone()).await;

    dashboard.dispatch(Msg::CrawlRequested {
        url: "a.com".to_string(),
    });
    assert_eq!(dashboard.in_flight(), 1);
    assert_eq!(status_of(&dashboard, 1), CrawlStatus::Running);

    dashboard.settle_all().await;
    assert_eq!(status_of(&dashboard, 1), CrawlStatus::Error);
    assert_eq!(
        dashboard.view().error.as_deref(),
        Some("Failed to crawl URL")
    );
    assert_eq!(gateway.calls(), vec!["list", "crawl a.com"]);
}

#[tokio::test]
async fn successful_crawl_refreshes_the_whole_list() {
    init_logging();
    let gateway = Arc::new(FakeGateway::with_records(vec![
        completed(1, "a.com"),
        completed(2, "b.com"),
    ]));
    let mut dashboard = loaded(gateway.clone()).await;

    dashboard
        .run(Msg::CrawlRequested {
            url: "b.com".to_string(),
        })
        .await;

    assert_eq!(gateway.calls(), vec!["list", "crawl b.com", "list"]);
    assert_eq!(status_of(&dashboard, 2), CrawlStatus::Completed);
    assert_eq!(
        dashboard.state().store().get(2).unwrap().title,
        "Title of b.com"
    );
    assert_eq!(dashboard.state().pending_requests(), 0);
}

#[tokio::test]
async fn bulk_rerun_stops_at_first_failure_then_refreshes_once() {
    init_logging();
    let gateway = Arc::new(
        FakeGateway::with_records(vec![
            completed(1, "a.com"),
            completed(2, "b.com"),
            completed(3, "c.com"),
        ])
        .failing("b.com"),
    );
    let mut dashboard = loaded(gateway.clone()).await;

    dashboard.dispatch(Msg::RerunRequested(vec![1, 2, 3]));
    assert_eq!(status_of(&dashboard, 2), CrawlStatus::Queued);
    assert_eq!(status_of(&dashboard, 3), CrawlStatus::Queued);
    dashboard.settle_all().await;

    assert_eq!(
        gateway.calls(),
        vec!["list", "crawl a.com", "crawl b.com", "list"]
    );
    assert_eq!(status_of(&dashboard, 1), CrawlStatus::Completed);
    assert_eq!(status_of(&dashboard, 2), CrawlStatus::Error);
    assert!(dashboard.view().error.is_some());
}

#[tokio::test]
async fn add_completes_while_another_crawl_is_still_in_flight() {
    init_logging();
    let gate = Arc::new(Notify::new());
    let gateway = Arc::new(
        FakeGateway::with_records(vec![completed(1, "https://a.example")])
            .gated("https://a.example", gate.clone()),
    );
    let mut dashboard = loaded(gateway.clone()).await;

    dashboard.dispatch(Msg::CrawlRequested {
        url: "https://a.example".to_string(),
    });
    dashboard.dispatch(Msg::UrlSubmitted("https://b.example".to_string()));
    assert_eq!(dashboard.in_flight(), 2);

    assert!(dashboard.settle_next().await);
    // The add landed first; the crawl is still pending and still optimistic.
    assert_eq!(dashboard.state().store().len(), 2);
    assert_eq!(status_of(&dashboard, 1), CrawlStatus::Running);
    assert_eq!(dashboard.in_flight(), 1);

    gate.notify_one();
    dashboard.settle_all().await;
    assert_eq!(status_of(&dashboard, 1), CrawlStatus::Completed);
    assert_eq!(status_of(&dashboard, 2), CrawlStatus::Queued);
    assert_eq!(dashboard.in_flight(), 0);
}

#[tokio::test]
async fn bulk_delete_refreshes_from_the_service() {
    init_logging();
    let gateway = Arc::new(FakeGateway::with_records(vec![
        completed(1, "a.com"),
        completed(2, "b.com"),
        completed(3, "c.com"),
    ]));
    let mut dashboard = loaded(gateway.clone()).await;

    dashboard.dispatch(Msg::SelectAllToggled(true));
    dashboard.run(Msg::DeleteSelected).await;

    assert_eq!(gateway.calls(), vec!["list", "delete [3, 2, 1]", "list"]);
    assert!(dashboard.state().store().is_empty());
    assert!(dashboard.state().selection().is_empty());
}

#[tokio::test]
async fn invalid_url_never_reaches_the_gateway() {
    init_logging();
    let gateway = Arc::new(FakeGateway::default());
    let mut dashboard = Dashboard::new(gateway.clone(), AppState::new());

    dashboard.run(Msg::UrlSubmitted("mailto:someone".to_string())).await;
    assert!(gateway.calls().is_empty());
    assert!(dashboard.view().error.is_some());
}

#[tokio::test]
async fn health_check_round_trip() {
    init_logging();
    let gateway = Arc::new(FakeGateway::default());
    let mut dashboard = Dashboard::new(gateway, AppState::new());
    dashboard.run(Msg::HealthCheckRequested).await;
    assert_eq!(dashboard.view().health.as_deref(), Some("ok"));
}

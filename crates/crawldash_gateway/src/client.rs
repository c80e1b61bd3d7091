use crawldash_core::{CrawlRecord, DashError, RecordId};
use crawldash_logging::{dash_debug, dash_warn};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::wire::{
    IdsRequest, UrlRequest, WireCrawlRecord, WireError, WireHealth, WireMessage,
};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Fallback when a failed response carries no usable `error` field.
const GENERIC_FAILURE: &str = "Request failed";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    pub user_agent: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("crawldash/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// The crawler service as seen by the dashboard.
#[async_trait::async_trait]
pub trait CrawlerGateway: Send + Sync {
    /// `GET /urls`
    async fn list(&self) -> Result<Vec<CrawlRecord>, DashError>;
    /// `POST /urls`
    async fn add(&self, url: &str) -> Result<CrawlRecord, DashError>;
    /// `POST /urls/crawl`
    async fn crawl(&self, url: &str) -> Result<CrawlRecord, DashError>;
    /// `DELETE /urls/{id}`
    async fn delete_one(&self, id: RecordId) -> Result<String, DashError>;
    /// `DELETE /urls`
    async fn delete_many(&self, ids: &[RecordId]) -> Result<String, DashError>;
    /// `GET /health`
    async fn health(&self) -> Result<String, DashError>;
}

/// REST client for the crawler service. No request timeout is set; the
/// transport's own behaviour applies.
#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestGateway {
    pub fn new(settings: GatewaySettings) -> Result<Self, DashError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent)
            .build()
            .map_err(|err| DashError::network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, DashError> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        dash_debug!("Gateway response status={} bytes={}", status, body.len());

        if !status.is_success() {
            return Err(remote_error(status.as_u16(), &body));
        }

        serde_json::from_slice(&body).map_err(|err| {
            dash_warn!("Undecodable gateway response: {}", err);
            DashError::network(format!("invalid response body: {err}"))
        })
    }
}

#[async_trait::async_trait]
impl CrawlerGateway for ReqwestGateway {
    async fn list(&self) -> Result<Vec<CrawlRecord>, DashError> {
        let records: Option<Vec<WireCrawlRecord>> =
            self.send(self.client.get(self.endpoint("/urls"))).await?;
        Ok(records
            .unwrap_or_default()
            .into_iter()
            .map(CrawlRecord::from)
            .collect())
    }

    async fn add(&self, url: &str) -> Result<CrawlRecord, DashError> {
        let request = self
            .client
            .post(self.endpoint("/urls"))
            .json(&UrlRequest { url });
        let record: WireCrawlRecord = self.send(request).await?;
        Ok(record.into())
    }

    async fn crawl(&self, url: &str) -> Result<CrawlRecord, DashError> {
        let request = self
            .client
            .post(self.endpoint("/urls/crawl"))
            .json(&UrlRequest { url });
        let record: WireCrawlRecord = self.send(request).await?;
        Ok(record.into())
    }

    async fn delete_one(&self, id: RecordId) -> Result<String, DashError> {
        let request = self.client.delete(self.endpoint(&format!("/urls/{id}")));
        let reply: WireMessage = self.send(request).await?;
        Ok(reply.message)
    }

    async fn delete_many(&self, ids: &[RecordId]) -> Result<String, DashError> {
        let request = self
            .client
            .delete(self.endpoint("/urls"))
            .json(&IdsRequest { ids });
        let reply: WireMessage = self.send(request).await?;
        Ok(reply.message)
    }

    async fn health(&self) -> Result<String, DashError> {
        let reply: WireHealth = self.send(self.client.get(self.endpoint("/health"))).await?;
        Ok(reply.status)
    }
}

fn remote_error(status: u16, body: &[u8]) -> DashError {
    let payload: WireError = serde_json::from_slice(body).unwrap_or_default();
    let error = payload
        .error
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
    DashError::remote(status, error, payload.details)
}

fn map_reqwest_error(err: reqwest::Error) -> DashError {
    dash_warn!("Gateway transport failure: {}", err);
    DashError::network(err.to_string())
}

use crawldash_core::{Effect, Msg};
use crawldash_logging::dash_info;

use crate::CrawlerGateway;

/// Run one effect against the gateway and turn the outcome into its
/// completion message.
pub async fn execute(gateway: &dyn CrawlerGateway, effect: Effect) -> Msg {
    match effect {
        Effect::FetchRecords => Msg::RecordsLoaded(gateway.list().await),
        Effect::CreateUrl { url } => {
            dash_info!("CreateUrl url_len={} url={}", url.len(), url);
            Msg::UrlAdded(gateway.add(&url).await)
        }
        Effect::TriggerCrawl { id, url, batch } => {
            dash_info!("TriggerCrawl id={:?} batch={:?} url={}", id, batch, url);
            let result = gateway.crawl(&url).await;
            Msg::CrawlFinished {
                id,
                url,
                batch,
                result,
            }
        }
        Effect::DeleteOne { id } => Msg::DeleteFinished {
            ids: vec![id],
            result: gateway.delete_one(id).await,
        },
        Effect::DeleteMany { ids } => {
            let result = gateway.delete_many(&ids).await;
            Msg::DeleteFinished { ids, result }
        }
        Effect::CheckHealth => Msg::HealthChecked(gateway.health().await),
    }
}

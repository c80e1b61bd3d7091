//! Crawldash gateway: REST client for the crawler service and the driver
//! that feeds its results into the core state machine.
mod client;
mod dashboard;
mod effects;
mod wire;

pub use client::{CrawlerGateway, GatewaySettings, ReqwestGateway, DEFAULT_BASE_URL};
pub use dashboard::Dashboard;
pub use effects::execute;

//! Infrastructure layer for the clinic intake client.
//!
//! HTTP adapters for the clinic backend and the chat engine, plus
//! configuration loading.

pub mod chatkit_bridge;
pub mod clinic_api_client;
pub mod config_service;
pub mod http_document_fetcher;
pub mod paths;
pub mod sse;

#[cfg(test)]
mod test_server;

pub use chatkit_bridge::ChatKitBridge;
pub use clinic_api_client::ClinicApiClient;
pub use config_service::ConfigService;
pub use http_document_fetcher::HttpIntakeDocumentFetcher;
pub use paths::IntakePaths;

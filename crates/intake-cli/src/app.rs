use intake_application::IntakeUseCase;
use intake_core::config::ClientConfig;
use intake_core::document::IntakeDocumentFetcher;
use intake_infrastructure::{ClinicApiClient, HttpIntakeDocumentFetcher};
use std::sync::Arc;

/// Wiring of the HTTP adapters for one run of the binary.
pub struct App {
    config: ClientConfig,
    usecase: IntakeUseCase,
    fetcher: Arc<dyn IntakeDocumentFetcher>,
}

impl App {
    pub fn new(config: ClientConfig) -> Self {
        let api = Arc::new(ClinicApiClient::new(&config));
        let fetcher = Arc::new(HttpIntakeDocumentFetcher::new(&config));
        Self {
            usecase: IntakeUseCase::new(api),
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn usecase(&self) -> &IntakeUseCase {
        &self.usecase
    }

    pub fn fetcher(&self) -> Arc<dyn IntakeDocumentFetcher> {
        self.fetcher.clone()
    }
}

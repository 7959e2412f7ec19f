//! HTTP implementation of [`IntakeDocumentFetcher`].

use async_trait::async_trait;
use intake_core::config::ClientConfig;
use intake_core::document::{IntakeDocument, IntakeDocumentFetcher};
use intake_core::error::{IntakeError, Result};
use intake_core::session::SessionId;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Fetches intake documents from `GET /api/medical_interviews/{id}`.
///
/// Every failure (transport, non-2xx status, malformed body) is reported as
/// `DocumentUnavailable`. The returned document is not checked against the
/// requested id; that is the caller's staleness check.
#[derive(Debug, Clone)]
pub struct HttpIntakeDocumentFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpIntakeDocumentFetcher {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Shares an existing client (and its connection pool).
    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            base_url: config.endpoint("api/medical_interviews"),
            timeout: config.request_timeout(),
        }
    }

    fn document_url(&self, session_id: &SessionId) -> String {
        format!("{}/{}", self.base_url, session_id)
    }
}

#[async_trait]
impl IntakeDocumentFetcher for HttpIntakeDocumentFetcher {
    async fn fetch(&self, session_id: &SessionId) -> Result<IntakeDocument> {
        let url = self.document_url(session_id);
        tracing::debug!("[HttpDocumentFetcher] GET {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| IntakeError::document_unavailable(session_id.as_str(), format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IntakeError::document_unavailable(
                session_id.as_str(),
                format!("backend returned {status}: {error_text}"),
            ));
        }

        let body: Value = response.json().await.map_err(|e| {
            IntakeError::document_unavailable(session_id.as_str(), format!("invalid JSON: {e}"))
        })?;

        IntakeDocument::from_json(body)
            .map_err(|e| IntakeError::document_unavailable(session_id.as_str(), e.to_string()))
    }
}

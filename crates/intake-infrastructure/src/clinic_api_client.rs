//! REST client for the clinic backend's appointment and interview endpoints.

use async_trait::async_trait;
use intake_core::appointment::{Appointment, ClinicApi, InterviewRecord, NewInterview};
use intake_core::config::ClientConfig;
use intake_core::error::{IntakeError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// `reqwest` implementation of [`ClinicApi`].
#[derive(Debug, Clone)]
pub struct ClinicApiClient {
    client: Client,
    config: ClientConfig,
}

impl ClinicApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    fn timeout(&self) -> Duration {
        self.config.request_timeout()
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| IntakeError::http(None, format!("{what} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IntakeError::http(Some(status.as_u16()), error_text));
        }
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let text = response
            .text()
            .await
            .map_err(|e| IntakeError::http(None, format!("failed to read body: {e}")))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ClinicApi for ClinicApiClient {
    async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        let url = self.config.endpoint("api/appointments");
        tracing::debug!("[ClinicApi] GET {}", url);

        let response = self.send(self.client.get(&url), "appointments").await?;
        Self::decode(response).await
    }

    async fn create_interview(&self, interview: &NewInterview) -> Result<InterviewRecord> {
        let url = self.config.endpoint("api/medical_interviews");
        tracing::debug!(
            "[ClinicApi] POST {} (appointment_id={})",
            url,
            interview.appointment_id
        );

        let response = self
            .send(self.client.post(&url).form(interview), "create interview")
            .await?;
        let record: InterviewRecord = Self::decode(response).await?;
        tracing::info!(
            "[ClinicApi] Created interview {} for appointment {}",
            record.id,
            record.appointment_id
        );
        Ok(record)
    }

    async fn latest_interview(&self, appointment_id: i64) -> Result<Option<InterviewRecord>> {
        let url = self.config.endpoint("api/medical_interviews");
        tracing::debug!("[ClinicApi] GET {}?appointment_id={}", url, appointment_id);

        let request = self
            .client
            .get(&url)
            .query(&[("appointment_id", appointment_id)]);
        let response = self.send(request, "latest interview").await?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::spawn_server;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Form, Json, Router};
    use serde::Deserialize;
    use serde_json::{Value, json};

    fn config_for(base_url: &str) -> ClientConfig {
        ClientConfig {
            api_base_url: base_url.to_string(),
            ..ClientConfig::default()
        }
    }

    #[derive(Deserialize)]
    struct CreateForm {
        appointment_id: i64,
        initial_consult: String,
    }

    #[derive(Deserialize)]
    struct LookupQuery {
        appointment_id: i64,
    }

    #[tokio::test]
    async fn test_list_appointments() {
        let app = Router::new().route(
            "/api/appointments",
            get(|| async {
                Json(json!([{
                    "id": 1,
                    "status": "scheduled",
                    "first_name": "Aiko",
                    "last_name": "Tanaka",
                    "age": 34,
                    "gender": "female",
                    "date": "2026-10-16T09:30:00"
                }]))
            }),
        );
        let base = spawn_server(app).await;
        let api = ClinicApiClient::new(&config_for(&base));

        let appointments = api.list_appointments().await.unwrap();

        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0].patient_name(), "Aiko Tanaka");
    }

    #[tokio::test]
    async fn test_create_interview_posts_form() {
        let app = Router::new().route(
            "/api/medical_interviews",
            axum::routing::post(|Form(form): Form<CreateForm>| async move {
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "id": 55,
                        "appointment_id": form.appointment_id,
                        "status": "draft",
                        "initial_consult": form.initial_consult,
                        "intake": {}
                    })),
                )
            }),
        );
        let base = spawn_server(app).await;
        let api = ClinicApiClient::new(&config_for(&base));

        let record = api
            .create_interview(&NewInterview {
                appointment_id: 7,
                initial_consult: "Chest tightness since last night".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(record.id, "55");
        assert_eq!(record.appointment_id, 7);
        let session = record.into_new_session();
        assert_eq!(session.seed_message(), Some("Chest tightness since last night"));
    }

    #[tokio::test]
    async fn test_latest_interview_null_is_none() {
        let app = Router::new().route(
            "/api/medical_interviews",
            get(|Query(query): Query<LookupQuery>| async move {
                if query.appointment_id == 1 {
                    Json(json!({"id": "9", "appointment_id": 1, "status": "draft"}))
                } else {
                    Json(Value::Null)
                }
            }),
        );
        let base = spawn_server(app).await;
        let api = ClinicApiClient::new(&config_for(&base));

        let found = api.latest_interview(1).await.unwrap().unwrap();
        assert_eq!(found.id, "9");
        assert!(api.latest_interview(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_status_maps_to_http_error() {
        let app = Router::new().route(
            "/api/appointments",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_server(app).await;
        let api = ClinicApiClient::new(&config_for(&base));

        let err = api.list_appointments().await.unwrap_err();
        assert!(matches!(err, IntakeError::Http { status: Some(500), .. }));
    }
}

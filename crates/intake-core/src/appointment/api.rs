use async_trait::async_trait;

use super::model::{Appointment, InterviewRecord, NewInterview};
use crate::error::Result;

/// The clinic backend's appointment and interview endpoints.
#[async_trait]
pub trait ClinicApi: Send + Sync {
    /// Lists appointments, newest first.
    async fn list_appointments(&self) -> Result<Vec<Appointment>>;

    /// Creates an interview from the patient's initial complaint.
    async fn create_interview(&self, request: &NewInterview) -> Result<InterviewRecord>;

    /// Returns the most recent interview for an appointment, if any.
    async fn latest_interview(&self, appointment_id: i64) -> Result<Option<InterviewRecord>>;
}

//! Intake use case implementation.
//!
//! Turns the staff-facing actions (pick an appointment, submit the initial
//! complaint, reopen an interview) into interview sessions ready for the
//! synchronization controller.

use intake_core::appointment::{Appointment, ClinicApi, NewInterview};
use intake_core::error::{IntakeError, Result};
use intake_core::session::InterviewSession;
use std::sync::Arc;

/// Use case for starting and resuming interviews.
///
/// # Responsibilities
///
/// - Listing appointments for the landing screen
/// - Creating an interview from the patient's initial complaint
/// - Resuming the latest interview of an appointment after a reload
pub struct IntakeUseCase {
    /// Clinic backend REST surface
    api: Arc<dyn ClinicApi>,
}

impl IntakeUseCase {
    pub fn new(api: Arc<dyn ClinicApi>) -> Self {
        Self { api }
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>> {
        self.api.list_appointments().await
    }

    /// Creates an interview for `appointment_id`.
    ///
    /// The returned session carries the complaint as its seed message, so the
    /// controller sends it as the first turn.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::Validation` for a blank complaint, otherwise any
    /// error from the backend.
    pub async fn start_interview(
        &self,
        appointment_id: i64,
        complaint: &str,
    ) -> Result<InterviewSession> {
        let complaint = complaint.trim();
        if complaint.is_empty() {
            return Err(IntakeError::validation("initial complaint must not be empty"));
        }

        let record = self
            .api
            .create_interview(&NewInterview {
                appointment_id,
                initial_consult: complaint.to_string(),
            })
            .await?;

        tracing::info!(
            "[IntakeUseCase] Started interview {} for appointment {}",
            record.id,
            appointment_id
        );
        Ok(record.into_new_session())
    }

    /// Reopens the most recent interview of `appointment_id` without a seed.
    pub async fn resume_interview(&self, appointment_id: i64) -> Result<InterviewSession> {
        let record = self
            .api
            .latest_interview(appointment_id)
            .await?
            .ok_or_else(|| IntakeError::not_found("MedicalInterview", appointment_id.to_string()))?;

        tracing::debug!(
            "[IntakeUseCase] Resuming interview {} for appointment {}",
            record.id,
            appointment_id
        );
        Ok(record.into_resumed_session())
    }
}

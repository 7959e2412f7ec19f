use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::session::{InterviewSession, SessionId};

/// One row of the staff appointment list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub status: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub date: NaiveDateTime,
}

impl Appointment {
    pub fn patient_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Form fields posted to create an interview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInterview {
    pub appointment_id: i64,
    pub initial_consult: String,
}

/// Interview row as returned by the backend after creation or lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub appointment_id: i64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub initial_consult: Option<String>,
    #[serde(default)]
    pub intake: Option<Value>,
}

impl InterviewRecord {
    pub fn session_id(&self) -> SessionId {
        SessionId::new(self.id.clone())
    }

    /// Session for a freshly created interview: the initial consult becomes
    /// the seed message.
    pub fn into_new_session(self) -> InterviewSession {
        let seed = self.initial_consult.clone().unwrap_or_default();
        InterviewSession::new(self.session_id()).with_seed_message(seed)
    }

    /// Session for an interview reopened after a reload: no seed is sent.
    pub fn into_resumed_session(self) -> InterviewSession {
        InterviewSession::new(self.session_id())
    }
}

/// Accepts RFC 3339 timestamps as well as naive ISO-8601 date-times.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.naive_local());
    }
    raw.parse::<NaiveDateTime>()
        .map_err(serde::de::Error::custom)
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or integer id, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_appointment_accepts_naive_timestamp() {
        let appointment: Appointment = serde_json::from_value(json!({
            "id": 1,
            "status": "scheduled",
            "first_name": "Hiroaki",
            "last_name": "Katori",
            "age": 41,
            "gender": "male",
            "date": "2025-12-01T10:30:00"
        }))
        .unwrap();

        assert_eq!(appointment.patient_name(), "Hiroaki Katori");
        assert_eq!(appointment.date.to_string(), "2025-12-01 10:30:00");
    }

    #[test]
    fn test_appointment_accepts_offset_timestamp() {
        let appointment: Appointment = serde_json::from_value(json!({
            "id": 2,
            "status": "scheduled",
            "first_name": "A",
            "last_name": "B",
            "age": 30,
            "gender": "female",
            "date": "2025-12-01T10:30:00+09:00"
        }))
        .unwrap();

        assert_eq!(appointment.date.to_string(), "2025-12-01 10:30:00");
    }

    #[test]
    fn test_interview_record_into_sessions() {
        let record: InterviewRecord = serde_json::from_value(json!({
            "id": 15,
            "appointment_id": 1,
            "status": "draft",
            "initial_consult": "Sore throat for two days",
            "intake": {"full_name": "Hiroaki Katori"}
        }))
        .unwrap();

        let session = record.clone().into_new_session();
        assert_eq!(session.id().as_str(), "15");
        assert_eq!(session.seed_message(), Some("Sore throat for two days"));

        let resumed = record.into_resumed_session();
        assert!(resumed.seed_message().is_none());
    }
}

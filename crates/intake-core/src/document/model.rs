use serde_json::Value;

use crate::error::{IntakeError, Result};
use crate::session::SessionId;

/// Fields that may carry the session identifier, in lookup order.
const SESSION_ID_FIELDS: [&str; 4] = ["session", "session_id", "interview_id", "id"];

/// Fields that may carry the displayed payload, in lookup order.
const PAYLOAD_FIELDS: [&str; 2] = ["data", "intake"];

/// A full replacement snapshot of one interview's structured intake record.
///
/// The shape is defined by the backend. The client only needs the session
/// identifier for the staleness check and a payload to display.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeDocument {
    session_id: SessionId,
    body: Value,
}

impl IntakeDocument {
    /// Builds a document from a raw JSON response body.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the body is not an object or carries
    /// no usable session identifier.
    pub fn from_json(body: Value) -> Result<Self> {
        let object = body.as_object().ok_or_else(|| IntakeError::Serialization {
            format: "JSON".to_string(),
            message: "intake document must be a JSON object".to_string(),
        })?;

        let session_id = SESSION_ID_FIELDS
            .iter()
            .filter_map(|field| object.get(*field))
            .find_map(id_from_value)
            .ok_or_else(|| IntakeError::Serialization {
                format: "JSON".to_string(),
                message: "intake document carries no session identifier".to_string(),
            })?;

        Ok(Self {
            session_id: SessionId::new(session_id),
            body,
        })
    }

    /// Builds a document for a known session from a bare payload.
    pub fn new(session_id: impl Into<SessionId>, data: Value) -> Self {
        let session_id = session_id.into();
        let body = serde_json::json!({
            "session": session_id.as_str(),
            "data": data,
        });
        Self { session_id, body }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// The full response body as received.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The part of the body meant for display.
    pub fn payload(&self) -> &Value {
        PAYLOAD_FIELDS
            .iter()
            .find_map(|field| self.body.get(*field).filter(|v| !v.is_null()))
            .unwrap_or(&self.body)
    }

    pub fn belongs_to(&self, session_id: &SessionId) -> bool {
        &self.session_id == session_id
    }

    /// Pretty-printed payload for plain rendering.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(self.payload()).unwrap_or_else(|_| self.payload().to_string())
    }
}

fn id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_session_field_and_data_payload() {
        let doc = IntakeDocument::from_json(json!({
            "session": "S1",
            "data": {"visit_reason": "sore throat"}
        }))
        .unwrap();

        assert_eq!(doc.session_id().as_str(), "S1");
        assert_eq!(doc.payload(), &json!({"visit_reason": "sore throat"}));
    }

    #[test]
    fn test_backend_row_with_numeric_id_and_intake() {
        let doc = IntakeDocument::from_json(json!({
            "id": 7,
            "appointment_id": 3,
            "status": "draft",
            "initial_consult": "headache",
            "intake": {"full_name": "Hiroaki Katori", "age_years": 41}
        }))
        .unwrap();

        assert_eq!(doc.session_id().as_str(), "7");
        assert_eq!(doc.payload()["full_name"], "Hiroaki Katori");
        assert!(doc.belongs_to(&SessionId::new("7")));
    }

    #[test]
    fn test_session_field_wins_over_row_id() {
        let doc = IntakeDocument::from_json(json!({"session": "S2", "id": 99})).unwrap();
        assert_eq!(doc.session_id().as_str(), "S2");
    }

    #[test]
    fn test_whole_body_is_payload_without_data_field() {
        let body = json!({"interview_id": "S3", "notes": "n/a"});
        let doc = IntakeDocument::from_json(body.clone()).unwrap();
        assert_eq!(doc.payload(), &body);
    }

    #[test]
    fn test_null_intake_falls_back_to_body() {
        let body = json!({"id": 1, "intake": null});
        let doc = IntakeDocument::from_json(body.clone()).unwrap();
        assert_eq!(doc.payload(), &body);
    }

    #[test]
    fn test_missing_identifier_is_rejected() {
        assert!(IntakeDocument::from_json(json!({"data": {}})).is_err());
        assert!(IntakeDocument::from_json(json!({"id": ""})).is_err());
        assert!(IntakeDocument::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_new_round_trips_through_from_json() {
        let doc = IntakeDocument::new("S4", json!({"duration": "2 days"}));
        let parsed = IntakeDocument::from_json(doc.body().clone()).unwrap();
        assert_eq!(parsed, doc);
    }
}

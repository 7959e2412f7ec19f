use serde::{Deserialize, Serialize};

use super::model::IntakeDocument;

/// Typed read view over the intake payload.
///
/// The backend owns the schema; every field is optional here and unknown
/// fields are ignored so that a schema change never breaks rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeForm {
    pub version: Option<u32>,
    /// Server timestamp, kept verbatim (the backend may omit the offset).
    pub updated_at: Option<String>,

    pub full_name: Option<String>,
    pub age_years: Option<u32>,
    pub sex: Option<String>,

    /// First free-text message from the patient, set by the server only.
    pub initial_patient_message: Option<String>,

    pub visit_reason: Option<String>,
    pub duration: Option<String>,
    pub severity_0_10: Option<u8>,

    pub symptoms: Vec<Symptom>,
    pub medications: Vec<Medication>,
    pub allergies: Vec<Allergy>,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Symptom {
    pub name: String,
    pub detail: Option<String>,
    pub onset: Option<String>,
    pub severity_0_10: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medication {
    pub name: String,
    pub dose: Option<String>,
    pub frequency: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Allergy {
    pub allergen: String,
    pub reaction: Option<String>,
    /// One of `mild`, `moderate`, `severe`, `unknown`.
    pub severity: Option<String>,
}

impl IntakeForm {
    /// Reads the form out of a document payload.
    ///
    /// Returns `None` when the payload does not match the expected shape.
    pub fn from_document(document: &IntakeDocument) -> Option<Self> {
        serde_json::from_value(document.payload().clone()).ok()
    }

    /// True when nothing clinically meaningful has been captured yet.
    pub fn is_empty(&self) -> bool {
        self.visit_reason.is_none()
            && self.duration.is_none()
            && self.severity_0_10.is_none()
            && self.symptoms.is_empty()
            && self.medications.is_empty()
            && self.allergies.is_empty()
            && self.notes.is_none()
    }
}

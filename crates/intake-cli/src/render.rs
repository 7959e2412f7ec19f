//! Plain-text rendering; colors are applied by the caller.

use intake_core::appointment::Appointment;
use intake_core::document::{IntakeDocument, IntakeForm};
use intake_core::presenter::CompletionSummary;

pub fn appointment_line(appointment: &Appointment) -> String {
    format!(
        "#{:<4} {}  {} ({}, {})  [{}]",
        appointment.id,
        appointment.date.format("%Y-%m-%d %H:%M"),
        appointment.patient_name(),
        appointment.age,
        appointment.gender,
        appointment.status
    )
}

/// Lines shown on the completion screen.
pub fn summary_lines(summary: &CompletionSummary) -> Vec<String> {
    match summary.document.as_deref() {
        Some(document) => document_lines(document),
        None => vec!["No intake data yet.".to_string()],
    }
}

/// Typed view when the payload fits the intake form, raw JSON otherwise.
pub fn document_lines(document: &IntakeDocument) -> Vec<String> {
    match IntakeForm::from_document(document) {
        Some(form) if !form.is_empty() || form.full_name.is_some() => form_lines(&form),
        _ => document.to_pretty_json().lines().map(str::to_string).collect(),
    }
}

fn form_lines(form: &IntakeForm) -> Vec<String> {
    let mut lines = Vec::new();
    let mut field = |label: &str, value: Option<String>| {
        if let Some(value) = value {
            lines.push(format!("{label:<16}{value}"));
        }
    };

    field("Name", form.full_name.clone());
    field("Age", form.age_years.map(|age| age.to_string()));
    field("Sex", form.sex.clone());
    field("First message", form.initial_patient_message.clone());
    field("Visit reason", form.visit_reason.clone());
    field("Duration", form.duration.clone());
    field("Severity", form.severity_0_10.map(|s| format!("{s}/10")));
    field("Notes", form.notes.clone());

    if !form.symptoms.is_empty() {
        lines.push("Symptoms".to_string());
        for symptom in &form.symptoms {
            let mut line = format!("  - {}", symptom.name);
            if let Some(detail) = &symptom.detail {
                line.push_str(&format!(": {detail}"));
            }
            if let Some(onset) = &symptom.onset {
                line.push_str(&format!(" (onset {onset})"));
            }
            if let Some(severity) = symptom.severity_0_10 {
                line.push_str(&format!(" [{severity}/10]"));
            }
            lines.push(line);
        }
    }

    if !form.medications.is_empty() {
        lines.push("Medications".to_string());
        for medication in &form.medications {
            let details: Vec<&str> = [&medication.dose, &medication.frequency, &medication.notes]
                .into_iter()
                .filter_map(|v| v.as_deref())
                .collect();
            if details.is_empty() {
                lines.push(format!("  - {}", medication.name));
            } else {
                lines.push(format!("  - {} ({})", medication.name, details.join(", ")));
            }
        }
    }

    if !form.allergies.is_empty() {
        lines.push("Allergies".to_string());
        for allergy in &form.allergies {
            let mut line = format!("  - {}", allergy.allergen);
            if let Some(reaction) = &allergy.reaction {
                line.push_str(&format!(": {reaction}"));
            }
            if let Some(severity) = &allergy.severity {
                line.push_str(&format!(" [{severity}]"));
            }
            lines.push(line);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_core::session::SessionId;
    use serde_json::json;
    use std::sync::Arc;

    fn summary(document: Option<IntakeDocument>) -> CompletionSummary {
        CompletionSummary {
            session_id: SessionId::new("1"),
            document: document.map(Arc::new),
            payload: None,
        }
    }

    #[test]
    fn test_no_snapshot_shows_placeholder() {
        assert_eq!(summary_lines(&summary(None)), vec!["No intake data yet.".to_string()]);
    }

    #[test]
    fn test_form_summary() {
        let doc = IntakeDocument::new(
            "1",
            json!({
                "full_name": "Mei Sato",
                "age_years": 29,
                "visit_reason": "migraine",
                "severity_0_10": 7,
                "medications": [{"name": "Sumatriptan", "dose": "50mg"}],
                "allergies": [{"allergen": "latex", "severity": "mild"}]
            }),
        );

        let lines = summary_lines(&summary(Some(doc)));

        assert!(lines.contains(&format!("{:<16}{}", "Name", "Mei Sato")));
        assert!(lines.contains(&format!("{:<16}{}", "Severity", "7/10")));
        assert!(lines.contains(&"  - Sumatriptan (50mg)".to_string()));
        assert!(lines.contains(&"  - latex [mild]".to_string()));
    }

    #[test]
    fn test_unknown_shape_falls_back_to_json() {
        let doc = IntakeDocument::new("1", json!({"symptoms": "free text"}));
        let lines = document_lines(&doc);
        assert_eq!(lines.first().map(String::as_str), Some("{"));
    }
}

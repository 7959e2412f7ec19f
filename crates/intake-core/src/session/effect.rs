use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IntakeError;

/// Effect name the chat engine emits once the intake is complete.
pub const INTERVIEW_COMPLETED: &str = "interview_completed";

/// A named application-level signal emitted by the chat engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl EffectEvent {
    pub fn new(name: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Convenience constructor for the completion effect.
    pub fn completed(payload: Option<Value>) -> Self {
        Self::new(INTERVIEW_COMPLETED, payload)
    }

    /// Resolves the effect name into a known kind.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::UnrecognizedEffect` for any other name. Callers
    /// are expected to ignore that error.
    pub fn kind(&self) -> Result<EffectKind, IntakeError> {
        EffectKind::parse(&self.name)
    }
}

/// Effects the client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    InterviewCompleted,
}

impl EffectKind {
    pub fn parse(name: &str) -> Result<Self, IntakeError> {
        match name {
            INTERVIEW_COMPLETED => Ok(Self::InterviewCompleted),
            other => Err(IntakeError::UnrecognizedEffect(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_completion_effect_is_recognized() {
        let effect = EffectEvent::completed(Some(json!({"note": "done"})));
        assert_eq!(effect.kind().unwrap(), EffectKind::InterviewCompleted);
    }

    #[test]
    fn test_unknown_effect_is_rejected() {
        let effect = EffectEvent::new("progress_update", None);
        let err = effect.kind().unwrap_err();
        assert!(err.is_unrecognized_effect());
    }

    #[test]
    fn test_effect_name_is_case_sensitive() {
        assert!(EffectKind::parse("Interview_Completed").is_err());
    }
}

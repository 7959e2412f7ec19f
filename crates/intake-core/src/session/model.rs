use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque interview identifier assigned by the backend.
///
/// The backend hands out integer primary keys, but the client never
/// interprets the value; it is compared and forwarded as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Lifecycle status of an interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Completed,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// One patient's conversational intake instance.
///
/// Created when the patient submits the initial complaint. The status moves
/// from `Active` to `Completed` exactly once and never back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSession {
    id: SessionId,
    seed_message: Option<String>,
    status: SessionStatus,
}

impl InterviewSession {
    /// Creates an active session without a seed message (e.g. after a reload).
    pub fn new(id: impl Into<SessionId>) -> Self {
        Self {
            id: id.into(),
            seed_message: None,
            status: SessionStatus::Active,
        }
    }

    /// Attaches the initial complaint to be sent as the first turn.
    ///
    /// Blank messages are treated as no seed at all.
    pub fn with_seed_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.seed_message = if message.trim().is_empty() {
            None
        } else {
            Some(message)
        };
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn seed_message(&self) -> Option<&str> {
        self.seed_message.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_terminal()
    }

    /// Marks the session completed.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn complete(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SessionStatus::Completed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_active() {
        let session = InterviewSession::new("42");
        assert_eq!(session.id().as_str(), "42");
        assert_eq!(session.status(), SessionStatus::Active);
        assert!(session.seed_message().is_none());
    }

    #[test]
    fn test_blank_seed_is_dropped() {
        let session = InterviewSession::new("42").with_seed_message("   \n");
        assert!(session.seed_message().is_none());

        let session = InterviewSession::new("42").with_seed_message("My throat hurts");
        assert_eq!(session.seed_message(), Some("My throat hurts"));
    }

    #[test]
    fn test_complete_transitions_once() {
        let mut session = InterviewSession::new("42");
        assert!(session.complete());
        assert!(session.is_completed());
        assert!(!session.complete());
        assert_eq!(session.status(), SessionStatus::Completed);
    }

    #[test]
    fn test_session_id_serializes_transparently() {
        let id = SessionId::new("S1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"S1\"");
    }
}

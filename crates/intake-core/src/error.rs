//! Error types for the clinic intake client.

use thiserror::Error;

/// A shared error type for the intake client crates.
///
/// The first three variants form the interview synchronization taxonomy.
/// None of them is fatal: `DocumentUnavailable` is recovered by keeping the
/// previous snapshot, `StaleSessionDiscarded` and `UnrecognizedEffect` are
/// dropped without surfacing anything to the user.
#[derive(Error, Debug, Clone)]
pub enum IntakeError {
    /// The intake document could not be fetched (network, status or payload).
    #[error("Intake document unavailable for session '{session_id}': {reason}")]
    DocumentUnavailable { session_id: String, reason: String },

    /// A fetch result arrived for a session that is no longer active.
    #[error("Stale snapshot discarded: expected session '{expected}', received '{received}'")]
    StaleSessionDiscarded { expected: String, received: String },

    /// The chat engine emitted an effect this client does not understand.
    #[error("Unrecognized effect: {0}")]
    UnrecognizedEffect(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// HTTP error talking to the clinic backend
    #[error("HTTP error{}: {}", status_suffix(.status), .message)]
    Http {
        status: Option<u16>,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "SSE"
        message: String,
    },

    /// Input rejected before reaching the backend
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Chat engine bridge error
    #[error("Bridge error: {0}")]
    Bridge(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntakeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a DocumentUnavailable error
    pub fn document_unavailable(session_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DocumentUnavailable {
            session_id: session_id.into(),
            reason: reason.into(),
        }
    }

    /// Creates a StaleSessionDiscarded error
    pub fn stale_session(expected: impl Into<String>, received: impl Into<String>) -> Self {
        Self::StaleSessionDiscarded {
            expected: expected.into(),
            received: received.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an Http error
    pub fn http(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Bridge error
    pub fn bridge(message: impl Into<String>) -> Self {
        Self::Bridge(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a DocumentUnavailable error
    pub fn is_document_unavailable(&self) -> bool {
        matches!(self, Self::DocumentUnavailable { .. })
    }

    /// Check if this is a StaleSessionDiscarded error
    pub fn is_stale_session(&self) -> bool {
        matches!(self, Self::StaleSessionDiscarded { .. })
    }

    /// Check if this is an UnrecognizedEffect error
    pub fn is_unrecognized_effect(&self) -> bool {
        matches!(self, Self::UnrecognizedEffect(_))
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for IntakeError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for IntakeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// A type alias for `Result<T, IntakeError>`.
pub type Result<T> = std::result::Result<T, IntakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taxonomy_predicates() {
        let unavailable = IntakeError::document_unavailable("S1", "connection refused");
        assert!(unavailable.is_document_unavailable());
        assert!(!unavailable.is_stale_session());

        let stale = IntakeError::stale_session("S2", "S1");
        assert!(stale.is_stale_session());
        assert!(!stale.is_unrecognized_effect());

        let effect = IntakeError::UnrecognizedEffect("progress".to_string());
        assert!(effect.is_unrecognized_effect());
    }

    #[test]
    fn test_http_error_display() {
        let with_status = IntakeError::http(Some(404), "Medical interview not found.");
        assert_eq!(
            with_status.to_string(),
            "HTTP error (404): Medical interview not found."
        );

        let without_status = IntakeError::http(None, "connection reset");
        assert_eq!(without_status.to_string(), "HTTP error: connection reset");
    }

    #[test]
    fn test_json_error_conversion() {
        let err: IntakeError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, IntakeError::Serialization { ref format, .. } if format == "JSON"));
    }
}

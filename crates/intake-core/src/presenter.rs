//! Completion hand-off.

use serde_json::Value;
use std::sync::Arc;

use crate::document::IntakeDocument;
use crate::session::SessionId;

/// Everything the completion screen needs.
#[derive(Debug, Clone)]
pub struct CompletionSummary {
    pub session_id: SessionId,
    /// Last settled snapshot; `None` if no fetch ever succeeded.
    pub document: Option<Arc<IntakeDocument>>,
    /// Payload attached to the completion effect.
    pub payload: Option<Value>,
}

/// Renders the final intake and offers the single "Complete" action.
///
/// Called at most once per session.
pub trait CompletionPresenter: Send + Sync {
    fn present(&self, summary: CompletionSummary);
}

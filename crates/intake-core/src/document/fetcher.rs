use async_trait::async_trait;

use super::model::IntakeDocument;
use crate::error::Result;
use crate::session::SessionId;

/// Retrieves the current structured intake document for a session.
///
/// Implementations must be idempotent (they never mutate server state) and
/// safe to call concurrently for different session identifiers.
#[async_trait]
pub trait IntakeDocumentFetcher: Send + Sync {
    /// Fetches the latest snapshot.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::DocumentUnavailable` on network failure, a
    /// non-2xx status, or a malformed payload.
    async fn fetch(&self, session_id: &SessionId) -> Result<IntakeDocument>;
}

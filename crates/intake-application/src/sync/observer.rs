use intake_core::error::IntakeError;
use intake_core::observer::SyncObserver;
use intake_core::session::{EffectEvent, SessionId};

/// [`SyncObserver`] that writes every outcome to `tracing`.
///
/// Stale snapshots and unknown effects are normal operation and stay at
/// debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSyncObserver;

impl SyncObserver for TracingSyncObserver {
    fn on_snapshot_applied(&self, session_id: &SessionId, revision: u64) {
        tracing::debug!(
            "[SyncController] Applied snapshot for session {} (revision {})",
            session_id,
            revision
        );
    }

    fn on_fetch_failed(&self, session_id: &SessionId, error: &IntakeError) {
        tracing::warn!(
            "[SyncController] Refresh failed for session {}, keeping previous snapshot: {}",
            session_id,
            error
        );
    }

    fn on_stale_discarded(&self, error: &IntakeError) {
        tracing::debug!("[SyncController] {}", error);
    }

    fn on_effect_ignored(&self, session_id: &SessionId, effect: &EffectEvent) {
        tracing::debug!(
            "[SyncController] Ignoring effect '{}' for session {}",
            effect.name,
            session_id
        );
    }

    fn on_seed_failed(&self, session_id: &SessionId, error: &IntakeError) {
        tracing::warn!(
            "[SyncController] Failed to send initial message for session {}: {}",
            session_id,
            error
        );
    }

    fn on_completed(&self, session_id: &SessionId) {
        tracing::info!("[SyncController] Interview {} completed", session_id);
    }
}

//! Observability hooks for interview synchronization.

use crate::error::IntakeError;
use crate::session::{EffectEvent, SessionId};

/// Receives notable controller outcomes.
///
/// None of these calls may fail or block; they exist for logging and
/// diagnostics only.
pub trait SyncObserver: Send + Sync {
    fn on_snapshot_applied(&self, session_id: &SessionId, revision: u64);
    fn on_fetch_failed(&self, session_id: &SessionId, error: &IntakeError);
    fn on_stale_discarded(&self, error: &IntakeError);
    fn on_effect_ignored(&self, session_id: &SessionId, effect: &EffectEvent);
    fn on_seed_failed(&self, session_id: &SessionId, error: &IntakeError);
    fn on_completed(&self, session_id: &SessionId);
}

/// Observer that discards everything.
pub struct NoOpSyncObserver;

impl SyncObserver for NoOpSyncObserver {
    fn on_snapshot_applied(&self, _session_id: &SessionId, _revision: u64) {}
    fn on_fetch_failed(&self, _session_id: &SessionId, _error: &IntakeError) {}
    fn on_stale_discarded(&self, _error: &IntakeError) {}
    fn on_effect_ignored(&self, _session_id: &SessionId, _effect: &EffectEvent) {}
    fn on_seed_failed(&self, _session_id: &SessionId, _error: &IntakeError) {}
    fn on_completed(&self, _session_id: &SessionId) {}
}

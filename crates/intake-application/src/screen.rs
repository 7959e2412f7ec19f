//! Interview screen navigation.

use crate::sync::{InterviewSyncController, InterviewSyncHandle, TracingSyncObserver};
use intake_core::bridge::ConversationEventBridge;
use intake_core::config::DEFAULT_HIGHLIGHT_DECAY_MS;
use intake_core::document::IntakeDocumentFetcher;
use intake_core::observer::SyncObserver;
use intake_core::presenter::CompletionPresenter;
use intake_core::session::InterviewSession;
use std::sync::Arc;
use std::time::Duration;

/// Owner of the interview screen's controller.
///
/// At most one controller is live. Opening another session, or closing the
/// screen, tears the previous controller down first, so a late result for the
/// old session can never reach the new one.
pub struct InterviewScreen {
    fetcher: Arc<dyn IntakeDocumentFetcher>,
    presenter: Arc<dyn CompletionPresenter>,
    observer: Arc<dyn SyncObserver>,
    decay_window: Duration,
    current: Option<InterviewSyncHandle>,
}

impl InterviewScreen {
    pub fn new(
        fetcher: Arc<dyn IntakeDocumentFetcher>,
        presenter: Arc<dyn CompletionPresenter>,
    ) -> Self {
        Self {
            fetcher,
            presenter,
            observer: Arc::new(TracingSyncObserver),
            decay_window: Duration::from_millis(DEFAULT_HIGHLIGHT_DECAY_MS),
            current: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn SyncObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_decay_window(mut self, window: Duration) -> Self {
        self.decay_window = window;
        self
    }

    /// Navigates to `session`, replacing whatever was open.
    pub async fn open(
        &mut self,
        session: InterviewSession,
        bridge: Arc<dyn ConversationEventBridge>,
    ) -> &InterviewSyncHandle {
        self.close().await;

        tracing::debug!("[InterviewScreen] Opening session {}", session.id());
        let handle = InterviewSyncController::new(
            session,
            self.fetcher.clone(),
            bridge,
            self.presenter.clone(),
        )
        .with_observer(self.observer.clone())
        .with_decay_window(self.decay_window)
        .spawn();

        self.current.insert(handle)
    }

    pub fn current(&self) -> Option<&InterviewSyncHandle> {
        self.current.as_ref()
    }

    /// Navigates away from the current session, if any.
    pub async fn close(&mut self) {
        if let Some(handle) = self.current.take() {
            tracing::debug!("[InterviewScreen] Leaving session {}", handle.session_id());
            handle.close().await;
        }
    }
}

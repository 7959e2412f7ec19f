//! Interview session synchronization controller.
//!
//! One controller task per open interview. It owns the session, reacts to the
//! bridge's turn and effect channels, keeps the document store current and
//! drives the presentation signal. Everything it decides happens on its own
//! task, so no state is shared mutably with the outside world; readers see
//! results through the `watch` channels exposed by [`InterviewSyncHandle`].

use super::signal::{DecayTimer, PresentationSignal};
use super::store::{IntakeDocumentStore, StoreState};
use futures::future::BoxFuture;
use intake_core::bridge::{BridgeChannels, ConversationEventBridge};
use intake_core::config::DEFAULT_HIGHLIGHT_DECAY_MS;
use intake_core::document::{IntakeDocument, IntakeDocumentFetcher};
use intake_core::error::{IntakeError, Result};
use intake_core::observer::{NoOpSyncObserver, SyncObserver};
use intake_core::presenter::{CompletionPresenter, CompletionSummary};
use intake_core::session::{EffectEvent, EffectKind, InterviewSession, SessionId, SessionStatus};
use serde_json::Value;
use std::future::{Future, pending};
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

type FetchFuture = BoxFuture<'static, Result<IntakeDocument>>;

/// Builder for one interview's synchronization task.
///
/// # Example
///
/// ```ignore
/// let handle = InterviewSyncController::new(session, fetcher, bridge, presenter)
///     .with_observer(Arc::new(TracingSyncObserver))
///     .spawn();
/// ```
pub struct InterviewSyncController {
    session: InterviewSession,
    fetcher: Arc<dyn IntakeDocumentFetcher>,
    bridge: Arc<dyn ConversationEventBridge>,
    presenter: Arc<dyn CompletionPresenter>,
    observer: Arc<dyn SyncObserver>,
    decay_window: Duration,
    initial_document: Option<IntakeDocument>,
}

impl InterviewSyncController {
    pub fn new(
        session: InterviewSession,
        fetcher: Arc<dyn IntakeDocumentFetcher>,
        bridge: Arc<dyn ConversationEventBridge>,
        presenter: Arc<dyn CompletionPresenter>,
    ) -> Self {
        Self {
            session,
            fetcher,
            bridge,
            presenter,
            observer: Arc::new(NoOpSyncObserver),
            decay_window: Duration::from_millis(DEFAULT_HIGHLIGHT_DECAY_MS),
            initial_document: None,
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

    /// Starts from a snapshot that was already fetched for this session,
    /// skipping the initial fetch.
    pub fn with_initial_document(mut self, document: IntakeDocument) -> Self {
        self.initial_document = Some(document);
        self
    }

    /// Attaches to the bridge and spawns the controller task.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(self) -> InterviewSyncHandle {
        let session_id = self.session.id().clone();

        let store = match self.initial_document {
            Some(document) if document.belongs_to(&session_id) => {
                IntakeDocumentStore::with_document(document)
            }
            Some(document) => {
                self.observer.on_stale_discarded(&IntakeError::stale_session(
                    session_id.as_str(),
                    document.session_id().as_str(),
                ));
                IntakeDocumentStore::new()
            }
            None => IntakeDocumentStore::new(),
        };
        let signal = PresentationSignal::new(self.decay_window);
        let (status_tx, status_rx) = watch::channel(self.session.status());
        let cancel = CancellationToken::new();
        let channels = self.bridge.attach(&session_id);

        tracing::debug!(
            "[SyncController] Spawning controller for session {} (seed: {})",
            session_id,
            self.session.seed_message().is_some()
        );

        let actor = SyncActor {
            session: self.session,
            fetcher: self.fetcher,
            bridge: self.bridge,
            presenter: self.presenter,
            observer: self.observer,
            store: store.clone(),
            signal: signal.clone(),
            status: status_tx,
            cancel: cancel.clone(),
            channels,
            turns_open: true,
            effects_open: true,
            in_flight: None,
            refresh_owed: false,
            decay: DecayTimer::default(),
        };
        let task = tokio::spawn(actor.run());

        InterviewSyncHandle {
            session_id,
            store,
            signal,
            status: status_rx,
            _guard: cancel.clone().drop_guard(),
            cancel,
            task,
        }
    }
}

/// Caller side of a running controller.
///
/// Dropping the handle tears the controller down, as does [`close`].
///
/// [`close`]: InterviewSyncHandle::close
pub struct InterviewSyncHandle {
    session_id: SessionId,
    store: IntakeDocumentStore,
    signal: PresentationSignal,
    status: watch::Receiver<SessionStatus>,
    cancel: CancellationToken,
    _guard: DropGuard,
    task: JoinHandle<()>,
}

impl InterviewSyncHandle {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn store(&self) -> &IntakeDocumentStore {
        &self.store
    }

    /// Latest applied snapshot.
    pub fn document(&self) -> Option<Arc<IntakeDocument>> {
        self.store.current()
    }

    pub fn subscribe_document(&self) -> watch::Receiver<StoreState> {
        self.store.subscribe()
    }

    pub fn is_recently_updated(&self) -> bool {
        self.signal.is_on()
    }

    pub fn subscribe_signal(&self) -> watch::Receiver<bool> {
        self.signal.subscribe()
    }

    pub fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.status.clone()
    }

    /// True once the controller task has exited (completed or torn down).
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Tears the controller down and waits for its task to exit.
    ///
    /// Any in-flight fetch and pending decay timer are dropped; nothing is
    /// applied after this returns.
    pub async fn close(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                tracing::error!(
                    "[SyncController] Controller for session {} panicked",
                    self.session_id
                );
            }
        }
    }
}

struct SyncActor {
    session: InterviewSession,
    fetcher: Arc<dyn IntakeDocumentFetcher>,
    bridge: Arc<dyn ConversationEventBridge>,
    presenter: Arc<dyn CompletionPresenter>,
    observer: Arc<dyn SyncObserver>,
    store: IntakeDocumentStore,
    signal: PresentationSignal,
    status: watch::Sender<SessionStatus>,
    cancel: CancellationToken,
    channels: BridgeChannels,
    turns_open: bool,
    effects_open: bool,
    /// At most one authoritative fetch.
    in_flight: Option<FetchFuture>,
    /// Turns seen while a fetch was in flight, collapsed into one.
    refresh_owed: bool,
    decay: DecayTimer,
}

impl SyncActor {
    async fn run(mut self) {
        if self.store.is_empty() {
            self.start_fetch();
        }
        self.send_seed_if_needed();

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    tracing::debug!(
                        "[SyncController] Session {} torn down",
                        self.session.id()
                    );
                    break;
                }

                effect = self.channels.effects.recv(), if self.effects_open => {
                    match effect {
                        Some(effect) => {
                            if self.on_effect(effect).is_break() {
                                break;
                            }
                        }
                        None => self.effects_open = false,
                    }
                }

                turn = self.channels.turns.recv(), if self.turns_open => {
                    match turn {
                        Some(_) => self.on_turn_finished(),
                        None => self.turns_open = false,
                    }
                }

                result = poll_slot(&mut self.in_flight), if self.in_flight.is_some() => {
                    self.in_flight = None;
                    self.on_fetch_settled(result);
                }

                _ = self.decay.expired(), if self.decay.is_armed() => {
                    self.signal.clear();
                }
            }
        }
    }

    /// The send runs on its own task: the latch is already claimed, so it
    /// has to finish even if this controller is torn down first.
    fn send_seed_if_needed(&self) {
        let Some(seed) = self.session.seed_message() else {
            return;
        };
        if self.bridge.has_transcript() || !self.bridge.claim_seed() {
            tracing::debug!(
                "[SyncController] Seed for session {} already sent",
                self.session.id()
            );
            return;
        }

        let bridge = self.bridge.clone();
        let observer = self.observer.clone();
        let session_id = self.session.id().clone();
        let text = seed.to_string();
        tokio::spawn(async move {
            if let Err(e) = bridge.send_message(&text).await {
                observer.on_seed_failed(&session_id, &e);
            }
        });
    }

    fn on_turn_finished(&mut self) {
        if self.in_flight.is_some() {
            tracing::debug!(
                "[SyncController] Turn finished during fetch, refresh owed for session {}",
                self.session.id()
            );
            self.refresh_owed = true;
            return;
        }
        self.start_fetch();
    }

    fn start_fetch(&mut self) {
        let fetcher = self.fetcher.clone();
        let session_id = self.session.id().clone();
        tracing::debug!("[SyncController] Fetching intake for session {}", session_id);
        self.in_flight = Some(Box::pin(async move { fetcher.fetch(&session_id).await }));
    }

    fn on_fetch_settled(&mut self, result: Result<IntakeDocument>) {
        match result {
            Ok(document) if document.belongs_to(self.session.id()) => {
                let revision = self.store.replace(document);
                self.signal.raise();
                self.decay.arm(self.signal.window());
                self.observer
                    .on_snapshot_applied(self.session.id(), revision);
            }
            Ok(document) => {
                self.observer.on_stale_discarded(&IntakeError::stale_session(
                    self.session.id().as_str(),
                    document.session_id().as_str(),
                ));
            }
            Err(e) => self.observer.on_fetch_failed(self.session.id(), &e),
        }

        if self.refresh_owed {
            self.refresh_owed = false;
            self.start_fetch();
        }
    }

    fn on_effect(&mut self, effect: EffectEvent) -> ControlFlow<()> {
        match effect.kind() {
            Ok(EffectKind::InterviewCompleted) => {
                self.complete(effect.payload);
                ControlFlow::Break(())
            }
            Err(_) => {
                self.observer.on_effect_ignored(self.session.id(), &effect);
                ControlFlow::Continue(())
            }
        }
    }

    /// Uses whatever snapshot is in memory; the in-flight fetch is abandoned.
    fn complete(&mut self, payload: Option<Value>) {
        if !self.session.complete() {
            return;
        }
        self.in_flight = None;
        self.refresh_owed = false;
        self.decay.cancel();
        self.status.send_replace(SessionStatus::Completed);

        self.presenter.present(CompletionSummary {
            session_id: self.session.id().clone(),
            document: self.store.current(),
            payload,
        });
        self.observer.on_completed(self.session.id());
    }
}

/// Polls an optional future; pending forever when the slot is empty.
async fn poll_slot<F>(slot: &mut Option<F>) -> F::Output
where
    F: Future + Unpin,
{
    match slot {
        Some(future) => future.await,
        None => pending().await,
    }
}

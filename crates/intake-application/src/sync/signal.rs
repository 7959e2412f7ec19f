use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{Sleep, sleep};

/// Transient "recently updated" flag shown next to the intake document.
///
/// Raised on every applied snapshot and cleared one decay window after the
/// most recent raise. Derived state only; never persisted.
#[derive(Debug, Clone)]
pub struct PresentationSignal {
    state: Arc<watch::Sender<bool>>,
    window: Duration,
}

impl PresentationSignal {
    pub fn new(window: Duration) -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            state: Arc::new(tx),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_on(&self) -> bool {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    pub(crate) fn raise(&self) {
        self.set(true);
    }

    pub(crate) fn clear(&self) {
        self.set(false);
    }

    /// Only notifies subscribers on an actual change.
    fn set(&self, on: bool) {
        self.state.send_if_modified(|current| {
            let changed = *current != on;
            *current = on;
            changed
        });
    }
}

/// Single cancellable decay timer.
///
/// Arming replaces the pending sleep, so only the latest arm can expire.
#[derive(Debug, Default)]
pub(crate) struct DecayTimer {
    sleep: Option<Pin<Box<Sleep>>>,
}

impl DecayTimer {
    pub(crate) fn arm(&mut self, window: Duration) {
        self.sleep = Some(Box::pin(sleep(window)));
    }

    pub(crate) fn cancel(&mut self) {
        self.sleep = None;
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.sleep.is_some()
    }

    /// Resolves when the armed sleep elapses; pending forever when disarmed.
    ///
    /// Cancel safe: dropping the future leaves the timer armed.
    pub(crate) async fn expired(&mut self) {
        match self.sleep.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.sleep = None;
            }
            None => std::future::pending().await,
        }
    }
}

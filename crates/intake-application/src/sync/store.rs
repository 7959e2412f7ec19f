use intake_core::document::IntakeDocument;
use std::sync::Arc;
use tokio::sync::watch;

/// What readers of the store observe.
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Latest applied snapshot.
    pub document: Option<Arc<IntakeDocument>>,
    /// Number of snapshots applied so far; the implicit document version.
    pub revision: u64,
}

/// Holds the latest known intake document for one interview session.
///
/// The snapshot is replaced as a whole and never patched. Only the
/// controller writes; any number of readers subscribe.
#[derive(Debug, Clone)]
pub struct IntakeDocumentStore {
    state: Arc<watch::Sender<StoreState>>,
}

impl IntakeDocumentStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(StoreState::default());
        Self {
            state: Arc::new(tx),
        }
    }

    /// Store seeded with a snapshot obtained elsewhere (e.g. a prior screen).
    pub fn with_document(document: IntakeDocument) -> Self {
        let store = Self::new();
        store.replace(document);
        store
    }

    /// Replaces the snapshot and returns the new revision.
    pub(crate) fn replace(&self, document: IntakeDocument) -> u64 {
        let document = Arc::new(document);
        let mut revision = 0;
        self.state.send_modify(|state| {
            state.revision += 1;
            state.document = Some(document);
            revision = state.revision;
        });
        revision
    }

    pub fn current(&self) -> Option<Arc<IntakeDocument>> {
        self.state.borrow().document.clone()
    }

    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().document.is_none()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }
}

impl Default for IntakeDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

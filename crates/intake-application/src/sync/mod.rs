//! Interview session synchronization.
//!
//! Keeps the conversation, the server-persisted intake document and its
//! on-screen representation consistent for one open interview.

mod controller;
mod observer;
mod signal;
mod store;


pub use controller::{InterviewSyncController, InterviewSyncHandle};
pub use observer::TracingSyncObserver;
pub use signal::PresentationSignal;
pub use store::{IntakeDocumentStore, StoreState};

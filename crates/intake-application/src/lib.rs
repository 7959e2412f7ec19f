//! Application layer for the clinic intake client.
//!
//! Coordinates domain types and infrastructure adapters: the interview
//! synchronization controller, screen navigation and the intake use case.

pub mod intake_usecase;
pub mod screen;
pub mod sync;

pub use intake_usecase::IntakeUseCase;
pub use screen::InterviewScreen;
pub use sync::{InterviewSyncController, InterviewSyncHandle, TracingSyncObserver};

pub mod appointment;
pub mod bridge;
pub mod config;
pub mod document;
pub mod error;
pub mod observer;
pub mod presenter;
pub mod session;

// Re-export common error type
pub use error::IntakeError;

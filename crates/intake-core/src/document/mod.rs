//! Structured intake document module.
//!
//! - `model`: The opaque snapshot (`IntakeDocument`) as returned by the backend
//! - `form`: A typed, lenient read view (`IntakeForm`) used for summaries
//! - `fetcher`: The retrieval interface (`IntakeDocumentFetcher`)

mod fetcher;
mod form;
mod model;

pub use fetcher::IntakeDocumentFetcher;
pub use form::{Allergy, IntakeForm, Medication, Symptom};
pub use model::IntakeDocument;

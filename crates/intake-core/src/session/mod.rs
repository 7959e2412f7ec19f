//! Interview session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session identity and lifecycle (`SessionId`, `InterviewSession`, `SessionStatus`)
//! - `effect`: Application-level effects emitted by the chat engine (`EffectEvent`, `EffectKind`)

mod effect;
mod model;

// Re-export public API
pub use effect::{EffectEvent, EffectKind, INTERVIEW_COMPLETED};
pub use model::{InterviewSession, SessionId, SessionStatus};

//! Appointment and interview-record module.
//!
//! This is the routine REST surface around the interview screen: listing
//! appointments for staff and creating an interview from the initial
//! complaint.

mod api;
mod model;

pub use api::ClinicApi;
pub use model::{Appointment, InterviewRecord, NewInterview};

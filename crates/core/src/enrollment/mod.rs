//! Enrollment transition engine.
//!
//! This module implements the academic state machine:
//! - Enrollment status transitions (active → completed/dropped)
//! - Transfer and promotion rules
//! - Deletion guards for owned records

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::EnrollmentError;
pub use service::EnrollmentService;
pub use types::{AttendanceStatus, EnrollmentStatus};

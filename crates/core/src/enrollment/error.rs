//! Enrollment error types.

use thiserror::Error;
use uuid::Uuid;

use scolara_shared::AppError;

use super::types::EnrollmentStatus;

/// Errors that can occur during enrollment operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EnrollmentError {
    // ========== Not-Found Errors ==========
    /// Enrollment absent or not tenant-visible.
    #[error("Enrollment not found: {0}")]
    NotFound(Uuid),

    /// Student absent or not tenant-visible.
    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),

    /// Period absent or not tenant-visible.
    #[error("Period not found: {0}")]
    PeriodNotFound(Uuid),

    /// Class absent or not tenant-visible.
    #[error("Class not found: {0}")]
    ClassNotFound(Uuid),

    // ========== Validation Errors ==========
    /// The class belongs to a different period than the enrollment target.
    #[error("Class {class_id} does not belong to period {period_id}")]
    ClassPeriodMismatch {
        /// The offending class.
        class_id: Uuid,
        /// The enrollment's period.
        period_id: Uuid,
    },

    /// The operation requires an active enrollment.
    #[error("Enrollment is {0}, expected active")]
    NotActive(EnrollmentStatus),

    // ========== Conflict Errors ==========
    /// At most one enrollment per (student, period).
    #[error("Student {student_id} is already enrolled in this period")]
    AlreadyEnrolled {
        /// The student with an existing enrollment.
        student_id: Uuid,
    },

    /// Reactivation would violate the one-active-per-(student, period) rule.
    #[error("Enrollment {0} cannot be reactivated: the student has another enrollment in this period")]
    ReactivationConflict(Uuid),

    /// Enrollments owning results, attendance, or invoices are never deleted.
    #[error("Enrollment {0} has dependent records and cannot be deleted")]
    HasDependentRecords(Uuid),

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl EnrollmentError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ENROLLMENT_NOT_FOUND",
            Self::StudentNotFound(_) => "STUDENT_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::ClassNotFound(_) => "CLASS_NOT_FOUND",
            Self::ClassPeriodMismatch { .. } => "CLASS_PERIOD_MISMATCH",
            Self::NotActive(_) => "ENROLLMENT_NOT_ACTIVE",
            Self::AlreadyEnrolled { .. } => "ALREADY_ENROLLED",
            Self::ReactivationConflict(_) => "REACTIVATION_CONFLICT",
            Self::HasDependentRecords(_) => "HAS_DEPENDENT_RECORDS",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        let msg = err.to_string();
        match err {
            EnrollmentError::NotFound(_)
            | EnrollmentError::StudentNotFound(_)
            | EnrollmentError::PeriodNotFound(_)
            | EnrollmentError::ClassNotFound(_) => Self::NotFound(msg),
            EnrollmentError::ClassPeriodMismatch { .. } | EnrollmentError::NotActive(_) => {
                Self::Validation(msg)
            }
            EnrollmentError::AlreadyEnrolled { .. }
            | EnrollmentError::ReactivationConflict(_)
            | EnrollmentError::HasDependentRecords(_) => Self::Conflict(msg),
            EnrollmentError::Database(_) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_mapping() {
        let err: AppError = EnrollmentError::NotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);

        let err: AppError = EnrollmentError::NotActive(EnrollmentStatus::Dropped).into();
        assert_eq!(err.status_code(), 400);

        let err: AppError = EnrollmentError::AlreadyEnrolled {
            student_id: Uuid::nil(),
        }
        .into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = EnrollmentError::HasDependentRecords(Uuid::nil()).into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            EnrollmentError::AlreadyEnrolled {
                student_id: Uuid::nil(),
            }
            .error_code(),
            "ALREADY_ENROLLED"
        );
        assert_eq!(
            EnrollmentError::NotActive(EnrollmentStatus::Completed).error_code(),
            "ENROLLMENT_NOT_ACTIVE"
        );
    }
}

//! Pure enrollment transition logic.
//!
//! Every rule here operates on snapshots of enrollment state. Persistence,
//! row locking, and tenant filtering live in the repository layer; this
//! service decides whether a transition is legal.

use uuid::Uuid;

use super::error::EnrollmentError;
use super::types::EnrollmentStatus;

/// Stateless enrollment transition engine.
pub struct EnrollmentService;

impl EnrollmentService {
    /// Validates that a new enrollment may be created.
    ///
    /// `has_existing` reflects whether any enrollment (in any status) already
    /// exists for the `(student, period)` pair.
    pub fn validate_create(
        student_id: Uuid,
        has_existing: bool,
    ) -> Result<(), EnrollmentError> {
        if has_existing {
            return Err(EnrollmentError::AlreadyEnrolled { student_id });
        }
        Ok(())
    }

    /// Validates that the target class belongs to the enrollment's period.
    pub fn validate_class_period(
        class_id: Uuid,
        class_period_id: Uuid,
        period_id: Uuid,
    ) -> Result<(), EnrollmentError> {
        if class_period_id != period_id {
            return Err(EnrollmentError::ClassPeriodMismatch {
                class_id,
                period_id,
            });
        }
        Ok(())
    }

    /// Validates a transfer to another class. Only active enrollments move.
    pub fn validate_transfer(status: EnrollmentStatus) -> Result<(), EnrollmentError> {
        Self::require_active(status)
    }

    /// Validates dropping an enrollment. Only active enrollments drop.
    pub fn validate_drop(status: EnrollmentStatus) -> Result<(), EnrollmentError> {
        Self::require_active(status)
    }

    /// Validates completing an enrollment, e.g. during promotion.
    pub fn validate_complete(status: EnrollmentStatus) -> Result<(), EnrollmentError> {
        Self::require_active(status)
    }

    /// Validates reactivating a terminal enrollment back to active.
    ///
    /// `has_other_active` reflects whether the student already holds a
    /// different active enrollment in the same period.
    pub fn validate_reactivate(
        enrollment_id: Uuid,
        status: EnrollmentStatus,
        has_other_active: bool,
    ) -> Result<(), EnrollmentError> {
        if !status.is_terminal() {
            // Already active; reactivating is a no-op request we reject.
            return Err(EnrollmentError::NotActive(status));
        }
        if has_other_active {
            return Err(EnrollmentError::ReactivationConflict(enrollment_id));
        }
        Ok(())
    }

    /// Validates hard deletion. Enrollments that own results, attendance
    /// records, or invoices are never deleted; drop them instead.
    pub fn validate_delete(
        enrollment_id: Uuid,
        dependent_count: u64,
    ) -> Result<(), EnrollmentError> {
        if dependent_count > 0 {
            return Err(EnrollmentError::HasDependentRecords(enrollment_id));
        }
        Ok(())
    }

    /// Decides whether an enrollment participates in a promotion run.
    ///
    /// Promotion completes active enrollments and creates successors in the
    /// target period; terminal enrollments are skipped, not failed.
    #[must_use]
    pub fn is_promotable(status: EnrollmentStatus) -> bool {
        status == EnrollmentStatus::Active
    }

    fn require_active(status: EnrollmentStatus) -> Result<(), EnrollmentError> {
        if status != EnrollmentStatus::Active {
            return Err(EnrollmentError::NotActive(status));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn test_create_rejects_duplicate() {
        let student = id();
        assert!(EnrollmentService::validate_create(student, false).is_ok());
        assert_eq!(
            EnrollmentService::validate_create(student, true),
            Err(EnrollmentError::AlreadyEnrolled { student_id: student })
        );
    }

    #[test]
    fn test_class_must_match_period() {
        let period = id();
        let class = id();
        assert!(EnrollmentService::validate_class_period(class, period, period).is_ok());

        let other_period = id();
        assert_eq!(
            EnrollmentService::validate_class_period(class, other_period, period),
            Err(EnrollmentError::ClassPeriodMismatch {
                class_id: class,
                period_id: period,
            })
        );
    }

    #[test]
    fn test_transfer_requires_active() {
        assert!(EnrollmentService::validate_transfer(EnrollmentStatus::Active).is_ok());
        assert_eq!(
            EnrollmentService::validate_transfer(EnrollmentStatus::Completed),
            Err(EnrollmentError::NotActive(EnrollmentStatus::Completed))
        );
        assert_eq!(
            EnrollmentService::validate_transfer(EnrollmentStatus::Dropped),
            Err(EnrollmentError::NotActive(EnrollmentStatus::Dropped))
        );
    }

    #[test]
    fn test_drop_and_complete_require_active() {
        assert!(EnrollmentService::validate_drop(EnrollmentStatus::Active).is_ok());
        assert!(EnrollmentService::validate_complete(EnrollmentStatus::Active).is_ok());
        assert!(EnrollmentService::validate_drop(EnrollmentStatus::Dropped).is_err());
        assert!(EnrollmentService::validate_complete(EnrollmentStatus::Completed).is_err());
    }

    #[test]
    fn test_reactivate_only_from_terminal() {
        let e = id();
        assert!(
            EnrollmentService::validate_reactivate(e, EnrollmentStatus::Dropped, false).is_ok()
        );
        assert!(
            EnrollmentService::validate_reactivate(e, EnrollmentStatus::Completed, false).is_ok()
        );
        assert_eq!(
            EnrollmentService::validate_reactivate(e, EnrollmentStatus::Active, false),
            Err(EnrollmentError::NotActive(EnrollmentStatus::Active))
        );
    }

    #[test]
    fn test_reactivate_conflict() {
        let e = id();
        assert_eq!(
            EnrollmentService::validate_reactivate(e, EnrollmentStatus::Dropped, true),
            Err(EnrollmentError::ReactivationConflict(e))
        );
    }

    #[test]
    fn test_delete_blocked_by_dependents() {
        let e = id();
        assert!(EnrollmentService::validate_delete(e, 0).is_ok());
        assert_eq!(
            EnrollmentService::validate_delete(e, 3),
            Err(EnrollmentError::HasDependentRecords(e))
        );
    }

    #[test]
    fn test_promotion_skips_terminal() {
        assert!(EnrollmentService::is_promotable(EnrollmentStatus::Active));
        assert!(!EnrollmentService::is_promotable(EnrollmentStatus::Completed));
        assert!(!EnrollmentService::is_promotable(EnrollmentStatus::Dropped));
    }
}

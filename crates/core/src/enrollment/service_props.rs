//! Property-based tests for the enrollment state machine.

use proptest::prelude::*;
use uuid::Uuid;

use super::service::EnrollmentService;
use super::types::EnrollmentStatus;

fn status_strategy() -> impl Strategy<Value = EnrollmentStatus> {
    prop_oneof![
        Just(EnrollmentStatus::Active),
        Just(EnrollmentStatus::Completed),
        Just(EnrollmentStatus::Dropped),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Transfer, drop, and complete agree: legal exactly from `Active`.
    #[test]
    fn prop_transitions_only_from_active(status in status_strategy()) {
        let expected = status == EnrollmentStatus::Active;
        prop_assert_eq!(EnrollmentService::validate_transfer(status).is_ok(), expected);
        prop_assert_eq!(EnrollmentService::validate_drop(status).is_ok(), expected);
        prop_assert_eq!(EnrollmentService::validate_complete(status).is_ok(), expected);
    }

    /// Reactivation and the forward transitions are mutually exclusive: no
    /// status permits both.
    #[test]
    fn prop_reactivate_disjoint_from_forward(status in status_strategy()) {
        let forward_ok = EnrollmentService::validate_drop(status).is_ok();
        let reactivate_ok =
            EnrollmentService::validate_reactivate(Uuid::new_v4(), status, false).is_ok();
        prop_assert!(!(forward_ok && reactivate_ok));
        prop_assert!(forward_ok || reactivate_ok);
    }

    /// A conflicting active enrollment always blocks reactivation, regardless
    /// of the source status.
    #[test]
    fn prop_reactivate_blocked_by_conflict(status in status_strategy()) {
        let result = EnrollmentService::validate_reactivate(Uuid::new_v4(), status, true);
        prop_assert!(result.is_err());
    }

    /// Promotion eligibility matches the forward-transition rule.
    #[test]
    fn prop_promotable_iff_active(status in status_strategy()) {
        prop_assert_eq!(
            EnrollmentService::is_promotable(status),
            EnrollmentService::validate_complete(status).is_ok()
        );
    }

    /// Deletion is blocked by any positive dependent count.
    #[test]
    fn prop_delete_guard(count in 0u64..10_000) {
        let result = EnrollmentService::validate_delete(Uuid::new_v4(), count);
        prop_assert_eq!(result.is_ok(), count == 0);
    }
}

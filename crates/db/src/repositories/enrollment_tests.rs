//! Tests for the enrollment repository.
//!
//! Promotion runs are driven against a mock connection with scripted query
//! results. A promotion is a single academic event: a conflict on any
//! student must surface as the whole run's error.

use std::collections::BTreeMap;

use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

use super::*;
use crate::entities::students;

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

fn period_row(tenant_id: Uuid, period_id: Uuid) -> academic_periods::Model {
    let now = Utc::now();
    academic_periods::Model {
        id: period_id,
        tenant_id,
        name: "2027/2028 Term 1".to_string(),
        starts_on: NaiveDate::from_ymd_opt(2027, 1, 5).unwrap(),
        ends_on: NaiveDate::from_ymd_opt(2027, 6, 20).unwrap(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn class_row(tenant_id: Uuid, period_id: Uuid) -> classes::Model {
    let now = Utc::now();
    classes::Model {
        id: Uuid::new_v4(),
        tenant_id,
        period_id,
        name: "Grade 8A".to_string(),
        level: 8,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn student_row(tenant_id: Uuid) -> students::Model {
    let now = Utc::now();
    students::Model {
        id: Uuid::new_v4(),
        tenant_id,
        first_name: "Siti".to_string(),
        last_name: "Rahma".to_string(),
        email: None,
        guardian_contact: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn promoted_row(
    tenant_id: Uuid,
    student: &students::Model,
    period_id: Uuid,
    class_id: Uuid,
) -> enrollments::Model {
    let now = Utc::now();
    enrollments::Model {
        id: Uuid::new_v4(),
        tenant_id,
        student_id: student.id,
        period_id,
        class_id,
        status: sea_orm_active_enums::EnrollmentStatus::Active,
        enrolled_on: NaiveDate::from_ymd_opt(2027, 1, 5).unwrap(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_promote_completes_previous_and_creates_successor() {
    let tenant_id = Uuid::new_v4();
    let target_period_id = Uuid::new_v4();
    let class = class_row(tenant_id, target_period_id);
    let student = student_row(tenant_id);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![period_row(tenant_id, target_period_id)]])
        .append_query_results([vec![class.clone()]])
        .append_query_results([vec![student.clone()]])
        .append_query_results([vec![count_row(0)]])
        .append_query_results([vec![promoted_row(
            tenant_id,
            &student,
            target_period_id,
            class.id,
        )]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = EnrollmentRepository::new(std::sync::Arc::new(db));
    let report = repo
        .promote(
            tenant_id,
            PromoteInput {
                student_ids: vec![student.id],
                target_period_id,
                target_class_id: class.id,
                mark_previous_as_completed: true,
                enrolled_on: NaiveDate::from_ymd_opt(2027, 1, 5).unwrap(),
            },
        )
        .await
        .unwrap();

    assert_eq!(report.promoted, 1);
    assert_eq!(report.enrollments[0].student_id, student.id);
    assert_eq!(report.enrollments[0].period_id, target_period_id);
    assert_eq!(
        report.enrollments[0].status,
        sea_orm_active_enums::EnrollmentStatus::Active
    );
}

#[tokio::test]
async fn test_promote_conflict_fails_whole_run() {
    let tenant_id = Uuid::new_v4();
    let target_period_id = Uuid::new_v4();
    let class = class_row(tenant_id, target_period_id);
    let s1 = student_row(tenant_id);
    let s2 = student_row(tenant_id);

    // The first student promotes cleanly; the second already holds an
    // enrollment in the target period, which must abort the run.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![period_row(tenant_id, target_period_id)]])
        .append_query_results([vec![class.clone()]])
        .append_query_results([vec![s1.clone()]])
        .append_query_results([vec![count_row(0)]])
        .append_query_results([vec![promoted_row(
            tenant_id,
            &s1,
            target_period_id,
            class.id,
        )]])
        .append_query_results([vec![s2.clone()]])
        .append_query_results([vec![count_row(1)]])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .into_connection();

    let repo = EnrollmentRepository::new(std::sync::Arc::new(db));
    let err = repo
        .promote(
            tenant_id,
            PromoteInput {
                student_ids: vec![s1.id, s2.id],
                target_period_id,
                target_class_id: class.id,
                mark_previous_as_completed: true,
                enrolled_on: NaiveDate::from_ymd_opt(2027, 1, 5).unwrap(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_promote_rejects_class_outside_target_period() {
    let tenant_id = Uuid::new_v4();
    let target_period_id = Uuid::new_v4();
    let class = class_row(tenant_id, Uuid::new_v4());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![period_row(tenant_id, target_period_id)]])
        .append_query_results([vec![class.clone()]])
        .into_connection();

    let repo = EnrollmentRepository::new(std::sync::Arc::new(db));
    let err = repo
        .promote(
            tenant_id,
            PromoteInput {
                student_ids: vec![Uuid::new_v4()],
                target_period_id,
                target_class_id: class.id,
                mark_previous_as_completed: true,
                enrolled_on: NaiveDate::from_ymd_opt(2027, 1, 5).unwrap(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

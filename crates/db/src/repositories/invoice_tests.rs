//! Tests for the invoice repository.
//!
//! Pure helper tests, plus generation runs driven against a mock connection
//! with scripted query results: a duplicate or inactive enrollment must be
//! reported as a keyed item error while its siblings are still created.

use std::collections::BTreeMap;

use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase, Value};

use super::*;

fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

fn period_row(tenant_id: Uuid, period_id: Uuid) -> academic_periods::Model {
    let now = Utc::now();
    academic_periods::Model {
        id: period_id,
        tenant_id,
        name: "2026/2027 Term 1".to_string(),
        starts_on: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
        ends_on: NaiveDate::from_ymd_opt(2026, 12, 20).unwrap(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn enrollment_row(
    tenant_id: Uuid,
    period_id: Uuid,
    status: sea_orm_active_enums::EnrollmentStatus,
) -> enrollments::Model {
    let now = Utc::now();
    enrollments::Model {
        id: Uuid::new_v4(),
        tenant_id,
        student_id: Uuid::new_v4(),
        period_id,
        class_id: Uuid::new_v4(),
        status,
        enrolled_on: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn generated_invoice(
    tenant_id: Uuid,
    enrollment: &enrollments::Model,
    period_id: Uuid,
) -> invoices::Model {
    let now = Utc::now();
    invoices::Model {
        id: Uuid::new_v4(),
        tenant_id,
        student_id: enrollment.student_id,
        enrollment_id: enrollment.id,
        period_id,
        description: "Term 1 tuition".to_string(),
        amount: dec!(1000),
        paid_amount: dec!(0),
        balance: dec!(1000),
        status: sea_orm_active_enums::InvoiceStatus::Pending,
        due_date: None,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

fn invoice_row() -> invoices::Model {
    let now = Utc::now();
    invoices::Model {
        id: Uuid::new_v4(),
        tenant_id: Uuid::new_v4(),
        student_id: Uuid::new_v4(),
        enrollment_id: Uuid::new_v4(),
        period_id: Uuid::new_v4(),
        description: "Term 2 tuition".to_string(),
        amount: dec!(1000),
        paid_amount: dec!(300),
        balance: dec!(700),
        status: sea_orm_active_enums::InvoiceStatus::Partial,
        due_date: NaiveDate::from_ymd_opt(2026, 9, 1),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[test]
fn test_invoice_state_projection() {
    let row = invoice_row();
    let state = invoice_state(&row);
    assert_eq!(state.amount, dec!(1000));
    assert_eq!(state.paid_amount, dec!(300));
    assert_eq!(state.balance, dec!(700));
    assert_eq!(state.status, InvoiceStatus::Partial);
    assert_eq!(state.due_date, row.due_date);
}

#[test]
fn test_non_unique_errors_surface_as_database() {
    let err = DbErr::Custom("connection reset".to_string());
    let mapped = map_unique_violation(err, || LedgerError::DuplicateInvoice {
        enrollment_id: Uuid::nil(),
    });
    assert!(matches!(mapped, AppError::Database(_)));
}

#[tokio::test]
async fn test_generate_skips_duplicate_and_creates_siblings() {
    let tenant_id = Uuid::new_v4();
    let period_id = Uuid::new_v4();
    let active = sea_orm_active_enums::EnrollmentStatus::Active;
    let e1 = enrollment_row(tenant_id, period_id, active);
    let e2 = enrollment_row(tenant_id, period_id, active);
    let e3 = enrollment_row(tenant_id, period_id, active);

    // Scripted in execution order: period lookup, then per enrollment the
    // lookup, the duplicate count, and (when clean) the inserted row. The
    // second enrollment already carries an invoice for the period.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![period_row(tenant_id, period_id)]])
        .append_query_results([vec![e1.clone()]])
        .append_query_results([vec![count_row(0)]])
        .append_query_results([vec![generated_invoice(tenant_id, &e1, period_id)]])
        .append_query_results([vec![e2.clone()]])
        .append_query_results([vec![count_row(1)]])
        .append_query_results([vec![e3.clone()]])
        .append_query_results([vec![count_row(0)]])
        .append_query_results([vec![generated_invoice(tenant_id, &e3, period_id)]])
        .into_connection();

    let repo = InvoiceRepository::new(std::sync::Arc::new(db));
    let outcome = repo
        .generate_invoices(
            tenant_id,
            GenerateInvoicesInput {
                enrollment_ids: vec![e1.id, e2.id, e3.id],
                period_id,
                description: "Term 1 tuition".to_string(),
                amount: dec!(1000),
                due_date: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.success_count(), 2);
    assert_eq!(outcome.error_count(), 1);
    assert_eq!(outcome.errors[0].key, e2.id);
    assert_eq!(outcome.errors[0].code, "CONFLICT");
    let billed: Vec<Uuid> = outcome.succeeded.iter().map(|i| i.enrollment_id).collect();
    assert_eq!(billed, vec![e1.id, e3.id]);
}

#[tokio::test]
async fn test_generate_rejects_inactive_enrollment() {
    let tenant_id = Uuid::new_v4();
    let period_id = Uuid::new_v4();
    let dropped = enrollment_row(
        tenant_id,
        period_id,
        sea_orm_active_enums::EnrollmentStatus::Dropped,
    );

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![period_row(tenant_id, period_id)]])
        .append_query_results([vec![dropped.clone()]])
        .into_connection();

    let repo = InvoiceRepository::new(std::sync::Arc::new(db));
    let outcome = repo
        .generate_invoices(
            tenant_id,
            GenerateInvoicesInput {
                enrollment_ids: vec![dropped.id],
                period_id,
                description: "Term 1 tuition".to_string(),
                amount: dec!(1000),
                due_date: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.success_count(), 0);
    assert_eq!(outcome.error_count(), 1);
    assert_eq!(outcome.errors[0].key, dropped.id);
}

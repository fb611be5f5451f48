//! Records repository for bulk result and attendance entry.
//!
//! Both operations are idempotent per key: re-recording a subject result or
//! a day's attendance overwrites the previous row instead of failing.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use scolara_core::batch::{Atomicity, BatchOutcome};
use scolara_core::enrollment::AttendanceStatus;
use scolara_shared::AppError;

use crate::batch;
use crate::entities::{attendance_records, enrollments, results, sea_orm_active_enums};

/// Error types for record operations.
#[derive(Debug, thiserror::Error)]
pub enum RecordsError {
    /// Enrollment absent or not tenant-visible.
    #[error("Enrollment not found: {0}")]
    EnrollmentNotFound(Uuid),

    /// Records attach to active enrollments only.
    #[error("Enrollment {0} is not active")]
    EnrollmentNotActive(Uuid),

    /// Scores are percentages.
    #[error("Score {0} is outside the range 0-100")]
    ScoreOutOfRange(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<RecordsError> for AppError {
    fn from(err: RecordsError) -> Self {
        let msg = err.to_string();
        match err {
            RecordsError::EnrollmentNotFound(_) => Self::NotFound(msg),
            RecordsError::EnrollmentNotActive(_) => Self::Conflict(msg),
            RecordsError::ScoreOutOfRange(_) => Self::Validation(msg),
            RecordsError::Database(_) => Self::Database(msg),
        }
    }
}

/// One subject result for an enrollment.
#[derive(Debug, Clone)]
pub struct ResultInput {
    /// Target enrollment.
    pub enrollment_id: Uuid,
    /// Subject name.
    pub subject: String,
    /// Score as a percentage.
    pub score: Decimal,
    /// Optional letter grade.
    pub grade: Option<String>,
}

/// One attendance record for an enrollment.
#[derive(Debug, Clone)]
pub struct AttendanceInput {
    /// Target enrollment.
    pub enrollment_id: Uuid,
    /// The day being recorded.
    pub recorded_on: NaiveDate,
    /// Attendance status.
    pub status: AttendanceStatus,
}

/// Records repository for bulk academic data entry.
#[derive(Debug, Clone)]
pub struct RecordsRepository {
    db: Arc<DatabaseConnection>,
}

impl RecordsRepository {
    /// Creates a new records repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Records subject results in bulk under the given atomicity policy.
    ///
    /// Failed items are keyed by enrollment id.
    ///
    /// # Errors
    ///
    /// In whole-batch mode, the first failing item aborts and returns its
    /// error. Per-item mode only fails on transaction-level errors.
    pub async fn bulk_record_results(
        &self,
        tenant_id: Uuid,
        inputs: Vec<ResultInput>,
        recorded_by: Uuid,
        atomicity: Atomicity,
    ) -> Result<BatchOutcome<results::Model, Uuid>, AppError> {
        batch::run(
            self.db.as_ref(),
            atomicity,
            inputs,
            |input| input.enrollment_id,
            move |txn, input| Box::pin(record_result(txn, tenant_id, input, recorded_by)),
        )
        .await
    }

    /// Records attendance in bulk under the given atomicity policy.
    ///
    /// Failed items are keyed by enrollment id.
    ///
    /// # Errors
    ///
    /// In whole-batch mode, the first failing item aborts and returns its
    /// error. Per-item mode only fails on transaction-level errors.
    pub async fn bulk_record_attendance(
        &self,
        tenant_id: Uuid,
        inputs: Vec<AttendanceInput>,
        recorded_by: Uuid,
        atomicity: Atomicity,
    ) -> Result<BatchOutcome<attendance_records::Model, Uuid>, AppError> {
        batch::run(
            self.db.as_ref(),
            atomicity,
            inputs,
            |input| input.enrollment_id,
            move |txn, input| Box::pin(record_attendance(txn, tenant_id, input, recorded_by)),
        )
        .await
    }
}

async fn require_active_enrollment(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    enrollment_id: Uuid,
) -> Result<enrollments::Model, RecordsError> {
    let enrollment = enrollments::Entity::find()
        .filter(enrollments::Column::Id.eq(enrollment_id))
        .filter(enrollments::Column::TenantId.eq(tenant_id))
        .one(txn)
        .await?
        .ok_or(RecordsError::EnrollmentNotFound(enrollment_id))?;
    if enrollment.status != sea_orm_active_enums::EnrollmentStatus::Active {
        return Err(RecordsError::EnrollmentNotActive(enrollment_id));
    }
    Ok(enrollment)
}

async fn record_result(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    input: ResultInput,
    recorded_by: Uuid,
) -> Result<results::Model, AppError> {
    if input.score < Decimal::ZERO || input.score > Decimal::from(100u8) {
        return Err(RecordsError::ScoreOutOfRange(input.score).into());
    }
    require_active_enrollment(txn, tenant_id, input.enrollment_id).await?;

    let now = Utc::now();
    let existing = results::Entity::find()
        .filter(results::Column::EnrollmentId.eq(input.enrollment_id))
        .filter(results::Column::Subject.eq(input.subject.clone()))
        .one(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let model = if let Some(existing) = existing {
        let mut active: results::ActiveModel = existing.into();
        active.score = Set(input.score);
        active.grade = Set(input.grade);
        active.recorded_by = Set(recorded_by);
        active.updated_at = Set(now.into());
        active
            .update(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
    } else {
        results::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            enrollment_id: Set(input.enrollment_id),
            subject: Set(input.subject),
            score: Set(input.score),
            grade: Set(input.grade),
            recorded_by: Set(recorded_by),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
    };

    Ok(model)
}

async fn record_attendance(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    input: AttendanceInput,
    recorded_by: Uuid,
) -> Result<attendance_records::Model, AppError> {
    require_active_enrollment(txn, tenant_id, input.enrollment_id).await?;

    let now = Utc::now();
    let existing = attendance_records::Entity::find()
        .filter(attendance_records::Column::EnrollmentId.eq(input.enrollment_id))
        .filter(attendance_records::Column::RecordedOn.eq(input.recorded_on))
        .one(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let model = if let Some(existing) = existing {
        let mut active: attendance_records::ActiveModel = existing.into();
        active.status = Set(input.status.into());
        active.recorded_by = Set(recorded_by);
        active
            .update(txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
    } else {
        attendance_records::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            enrollment_id: Set(input.enrollment_id),
            recorded_on: Set(input.recorded_on),
            status: Set(input.status.into()),
            recorded_by: Set(recorded_by),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
    };

    Ok(model)
}

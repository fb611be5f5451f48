//! Enrollment repository for academic state transitions.
//!
//! Transitions lock the enrollment row before validating, so concurrent
//! drops, transfers, and promotions serialize against each other.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use scolara_core::batch::{Atomicity, BatchOutcome};
use scolara_core::enrollment::{EnrollmentError, EnrollmentService, EnrollmentStatus};
use scolara_shared::AppError;

use crate::batch;
use crate::entities::{
    academic_periods, attendance_records, classes, enrollments, invoices, results,
    sea_orm_active_enums,
};

/// Error types for enrollment operations.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentRepoError {
    /// An enrollment rule was violated.
    #[error(transparent)]
    Domain(#[from] EnrollmentError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<EnrollmentRepoError> for AppError {
    fn from(err: EnrollmentRepoError) -> Self {
        match err {
            EnrollmentRepoError::Domain(e) => e.into(),
            EnrollmentRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for creating an enrollment.
#[derive(Debug, Clone)]
pub struct CreateEnrollmentInput {
    /// The student to enrol.
    pub student_id: Uuid,
    /// The academic period.
    pub period_id: Uuid,
    /// The class within the period.
    pub class_id: Uuid,
    /// Enrollment date.
    pub enrolled_on: NaiveDate,
}

/// Input for transferring an enrollment to another class.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// The class to move the enrollment into. Must belong to the same period.
    pub target_class_id: Uuid,
}

/// Input for a promotion run.
#[derive(Debug, Clone)]
pub struct PromoteInput {
    /// The students to promote.
    pub student_ids: Vec<Uuid>,
    /// Period the new enrollments are created in.
    pub target_period_id: Uuid,
    /// Class the new enrollments are created in. Must belong to the target
    /// period.
    pub target_class_id: Uuid,
    /// Whether each student's currently active enrollments are flipped to
    /// completed as part of the run.
    pub mark_previous_as_completed: bool,
    /// Enrollment date stamped on the new enrollments.
    pub enrolled_on: NaiveDate,
}

/// Result of a promotion run.
#[derive(Debug, Clone)]
pub struct PromotionReport {
    /// Number of enrollments promoted.
    pub promoted: usize,
    /// The successor enrollments created in the target period.
    pub enrollments: Vec<enrollments::Model>,
}

/// Enrollment repository for transition operations.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    db: Arc<DatabaseConnection>,
}

impl EnrollmentRepository {
    /// Creates a new enrollment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Enrolls a student into a class for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the student or class is missing, the class belongs
    /// to a different period, or the student is already enrolled.
    pub async fn create_enrollment(
        &self,
        tenant_id: Uuid,
        input: CreateEnrollmentInput,
    ) -> Result<enrollments::Model, AppError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let model = create_in_txn(&txn, tenant_id, input).await?;
        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(model)
    }

    /// Enrolls many students under the given atomicity policy.
    ///
    /// Failed items are keyed by student id.
    ///
    /// # Errors
    ///
    /// In whole-batch mode, the first failing item aborts and returns its
    /// error. Per-item mode only fails on transaction-level errors.
    pub async fn bulk_create(
        &self,
        tenant_id: Uuid,
        inputs: Vec<CreateEnrollmentInput>,
        atomicity: Atomicity,
    ) -> Result<BatchOutcome<enrollments::Model, Uuid>, AppError> {
        batch::run(
            self.db.as_ref(),
            atomicity,
            inputs,
            |input| input.student_id,
            move |txn, input| Box::pin(create_in_txn(txn, tenant_id, input)),
        )
        .await
    }

    /// Moves an active enrollment to another class in the same period.
    ///
    /// # Errors
    ///
    /// Returns an error if the enrollment is not active or the target class
    /// belongs to a different period.
    pub async fn transfer(
        &self,
        tenant_id: Uuid,
        enrollment_id: Uuid,
        input: TransferInput,
    ) -> Result<enrollments::Model, EnrollmentRepoError> {
        let txn = self.db.begin().await?;

        let enrollment = find_locked(&txn, tenant_id, enrollment_id).await?;
        EnrollmentService::validate_transfer(enrollment.status.into())?;

        let target = classes::Entity::find()
            .filter(classes::Column::Id.eq(input.target_class_id))
            .filter(classes::Column::TenantId.eq(tenant_id))
            .one(&txn)
            .await?
            .ok_or(EnrollmentError::ClassNotFound(input.target_class_id))?;
        EnrollmentService::validate_class_period(target.id, target.period_id, enrollment.period_id)?;

        let mut active: enrollments::ActiveModel = enrollment.into();
        active.class_id = Set(target.id);
        active.updated_at = Set(Utc::now().into());
        let enrollment = active.update(&txn).await?;

        txn.commit().await?;
        Ok(enrollment)
    }

    /// Drops an active enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if the enrollment is not active.
    pub async fn drop_enrollment(
        &self,
        tenant_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<enrollments::Model, EnrollmentRepoError> {
        self.transition(tenant_id, enrollment_id, EnrollmentStatus::Dropped)
            .await
    }

    /// Completes an active enrollment outside a promotion run.
    ///
    /// # Errors
    ///
    /// Returns an error if the enrollment is not active.
    pub async fn complete(
        &self,
        tenant_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<enrollments::Model, EnrollmentRepoError> {
        self.transition(tenant_id, enrollment_id, EnrollmentStatus::Completed)
            .await
    }

    /// Reactivates a dropped or completed enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if the enrollment is already active or the student
    /// holds another active enrollment in the period.
    pub async fn reactivate(
        &self,
        tenant_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<enrollments::Model, EnrollmentRepoError> {
        let txn = self.db.begin().await?;

        let enrollment = find_locked(&txn, tenant_id, enrollment_id).await?;

        let conflicting = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(enrollment.student_id))
            .filter(enrollments::Column::PeriodId.eq(enrollment.period_id))
            .filter(enrollments::Column::Id.ne(enrollment.id))
            .filter(
                enrollments::Column::Status
                    .eq(sea_orm_active_enums::EnrollmentStatus::Active),
            )
            .count(&txn)
            .await?;
        EnrollmentService::validate_reactivate(
            enrollment.id,
            enrollment.status.into(),
            conflicting > 0,
        )?;

        let mut active: enrollments::ActiveModel = enrollment.into();
        active.status = Set(sea_orm_active_enums::EnrollmentStatus::Active);
        active.updated_at = Set(Utc::now().into());
        let enrollment = active.update(&txn).await?;

        txn.commit().await?;
        Ok(enrollment)
    }

    /// Promotes the given students into the target period and class,
    /// atomically.
    ///
    /// Each student's currently active enrollments are completed (unless
    /// `mark_previous_as_completed` is off) and a new active enrollment is
    /// created in the target class. A promotion is a single academic event:
    /// any failure rolls back the whole run.
    ///
    /// # Errors
    ///
    /// Returns an error if the target period or class is missing, the class
    /// belongs to a different period, a student is missing, or any student is
    /// already enrolled in the target period.
    pub async fn promote(
        &self,
        tenant_id: Uuid,
        input: PromoteInput,
    ) -> Result<PromotionReport, AppError> {
        let db_err = |e: DbErr| AppError::Database(e.to_string());

        academic_periods::Entity::find()
            .filter(academic_periods::Column::Id.eq(input.target_period_id))
            .filter(academic_periods::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_err)?
            .ok_or(EnrollmentError::PeriodNotFound(input.target_period_id))?;

        let class = classes::Entity::find()
            .filter(classes::Column::Id.eq(input.target_class_id))
            .filter(classes::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_err)?
            .ok_or(EnrollmentError::ClassNotFound(input.target_class_id))?;
        EnrollmentService::validate_class_period(class.id, class.period_id, input.target_period_id)
            .map_err(AppError::from)?;

        let target_period_id = input.target_period_id;
        let target_class_id = input.target_class_id;
        let mark_previous = input.mark_previous_as_completed;
        let enrolled_on = input.enrolled_on;

        let outcome = batch::run(
            self.db.as_ref(),
            Atomicity::WholeBatch,
            input.student_ids,
            |id| *id,
            move |txn, student_id| {
                Box::pin(promote_one(
                    txn,
                    tenant_id,
                    student_id,
                    target_period_id,
                    target_class_id,
                    mark_previous,
                    enrolled_on,
                ))
            },
        )
        .await?;

        Ok(PromotionReport {
            promoted: outcome.success_count(),
            enrollments: outcome.succeeded,
        })
    }

    /// Deletes an enrollment with no dependent records.
    ///
    /// # Errors
    ///
    /// Returns an error if results, attendance records, or invoices still
    /// reference the enrollment.
    pub async fn delete_enrollment(
        &self,
        tenant_id: Uuid,
        enrollment_id: Uuid,
    ) -> Result<(), EnrollmentRepoError> {
        let txn = self.db.begin().await?;

        let enrollment = find_locked(&txn, tenant_id, enrollment_id).await?;

        let mut dependents = results::Entity::find()
            .filter(results::Column::EnrollmentId.eq(enrollment_id))
            .count(&txn)
            .await?;
        dependents += attendance_records::Entity::find()
            .filter(attendance_records::Column::EnrollmentId.eq(enrollment_id))
            .count(&txn)
            .await?;
        dependents += invoices::Entity::find()
            .filter(invoices::Column::EnrollmentId.eq(enrollment_id))
            .count(&txn)
            .await?;
        EnrollmentService::validate_delete(enrollment_id, dependents)?;

        enrollments::Entity::delete_by_id(enrollment.id)
            .exec(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn transition(
        &self,
        tenant_id: Uuid,
        enrollment_id: Uuid,
        to_status: EnrollmentStatus,
    ) -> Result<enrollments::Model, EnrollmentRepoError> {
        let txn = self.db.begin().await?;

        let enrollment = find_locked(&txn, tenant_id, enrollment_id).await?;
        match to_status {
            EnrollmentStatus::Dropped => {
                EnrollmentService::validate_drop(enrollment.status.into())?;
            }
            EnrollmentStatus::Completed => {
                EnrollmentService::validate_complete(enrollment.status.into())?;
            }
            EnrollmentStatus::Active => {
                return Err(EnrollmentError::NotActive(enrollment.status.into()).into());
            }
        }

        let mut active: enrollments::ActiveModel = enrollment.into();
        active.status = Set(to_status.into());
        active.updated_at = Set(Utc::now().into());
        let enrollment = active.update(&txn).await?;

        txn.commit().await?;
        Ok(enrollment)
    }
}

async fn find_locked(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    enrollment_id: Uuid,
) -> Result<enrollments::Model, EnrollmentRepoError> {
    enrollments::Entity::find()
        .filter(enrollments::Column::Id.eq(enrollment_id))
        .filter(enrollments::Column::TenantId.eq(tenant_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| EnrollmentError::NotFound(enrollment_id).into())
}

async fn create_in_txn(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    input: CreateEnrollmentInput,
) -> Result<enrollments::Model, AppError> {
    let db_err = |e: DbErr| AppError::Database(e.to_string());

    let student = crate::entities::students::Entity::find()
        .filter(crate::entities::students::Column::Id.eq(input.student_id))
        .filter(crate::entities::students::Column::TenantId.eq(tenant_id))
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(EnrollmentError::StudentNotFound(input.student_id))?;

    let class = classes::Entity::find()
        .filter(classes::Column::Id.eq(input.class_id))
        .filter(classes::Column::TenantId.eq(tenant_id))
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(EnrollmentError::ClassNotFound(input.class_id))?;
    EnrollmentService::validate_class_period(class.id, class.period_id, input.period_id)
        .map_err(AppError::from)?;

    let existing = enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(student.id))
        .filter(enrollments::Column::PeriodId.eq(input.period_id))
        .count(txn)
        .await
        .map_err(db_err)?;
    EnrollmentService::validate_create(student.id, existing > 0).map_err(AppError::from)?;

    let now = Utc::now();
    enrollments::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        student_id: Set(student.id),
        period_id: Set(input.period_id),
        class_id: Set(class.id),
        status: Set(sea_orm_active_enums::EnrollmentStatus::Active),
        enrolled_on: Set(input.enrolled_on),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
            EnrollmentError::AlreadyEnrolled {
                student_id: input.student_id,
            }
            .into()
        }
        _ => AppError::Database(e.to_string()),
    })
}

async fn promote_one(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    student_id: Uuid,
    target_period_id: Uuid,
    target_class_id: Uuid,
    mark_previous: bool,
    enrolled_on: NaiveDate,
) -> Result<enrollments::Model, AppError> {
    let db_err = |e: DbErr| AppError::Database(e.to_string());

    crate::entities::students::Entity::find()
        .filter(crate::entities::students::Column::Id.eq(student_id))
        .filter(crate::entities::students::Column::TenantId.eq(tenant_id))
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(EnrollmentError::StudentNotFound(student_id))?;

    let existing = enrollments::Entity::find()
        .filter(enrollments::Column::StudentId.eq(student_id))
        .filter(enrollments::Column::PeriodId.eq(target_period_id))
        .count(txn)
        .await
        .map_err(db_err)?;
    if existing > 0 {
        return Err(EnrollmentError::AlreadyEnrolled { student_id }.into());
    }

    if mark_previous {
        enrollments::Entity::update_many()
            .col_expr(
                enrollments::Column::Status,
                sea_orm_active_enums::EnrollmentStatus::Completed.as_enum(),
            )
            .filter(enrollments::Column::TenantId.eq(tenant_id))
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(
                enrollments::Column::Status
                    .eq(sea_orm_active_enums::EnrollmentStatus::Active),
            )
            .exec(txn)
            .await
            .map_err(db_err)?;
    }

    let now = Utc::now();
    enrollments::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        student_id: Set(student_id),
        period_id: Set(target_period_id),
        class_id: Set(target_class_id),
        status: Set(sea_orm_active_enums::EnrollmentStatus::Active),
        enrolled_on: Set(enrolled_on),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await
    .map_err(|e| match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
            EnrollmentError::AlreadyEnrolled { student_id }.into()
        }
        _ => AppError::Database(e.to_string()),
    })
}

#[cfg(test)]
#[path = "enrollment_tests.rs"]
mod tests;

//! Invoice repository for ledger database operations.
//!
//! All mutations run inside transactions. Payment application takes a row
//! lock on the invoice so concurrent payments serialize and the second one
//! sees the updated balance.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use scolara_core::batch::{Atomicity, BatchOutcome};
use scolara_core::ledger::{FinancialSummary, InvoiceState, InvoiceStatus, LedgerError, LedgerService, PaymentMethod};
use scolara_shared::{AppError, PageRequest};

use crate::batch;
use crate::entities::{academic_periods, enrollments, invoices, payments, sea_orm_active_enums};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceRepoError {
    /// A ledger rule was violated.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<InvoiceRepoError> for AppError {
    fn from(err: InvoiceRepoError) -> Self {
        match err {
            InvoiceRepoError::Ledger(e) => e.into(),
            InvoiceRepoError::Database(e) => Self::Database(e.to_string()),
        }
    }
}

/// Input for generating invoices over a set of enrollments.
#[derive(Debug, Clone)]
pub struct GenerateInvoicesInput {
    /// The enrollments to invoice.
    pub enrollment_ids: Vec<Uuid>,
    /// Period the charges belong to.
    pub period_id: Uuid,
    /// Invoice description, e.g. `"Term 2 tuition"`.
    pub description: String,
    /// Amount charged per enrollment.
    pub amount: Decimal,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
}

/// Input for recording a payment against an invoice.
#[derive(Debug, Clone)]
pub struct RecordPaymentInput {
    /// Payment amount.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// External reference, e.g. a bank transaction id.
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Date the payment was made.
    pub paid_on: NaiveDate,
    /// The user recording the payment.
    pub recorded_by: Uuid,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Filter by period.
    pub period_id: Option<Uuid>,
    /// Filter by student.
    pub student_id: Option<Uuid>,
    /// Filter by enrollment.
    pub enrollment_id: Option<Uuid>,
}

/// A recorded payment together with the updated invoice.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    /// The invoice after the payment was applied.
    pub invoice: invoices::Model,
    /// The payment row.
    pub payment: payments::Model,
}

/// Invoice repository for ledger operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Generates one invoice per requested enrollment.
    ///
    /// Runs per-item: an enrollment that is missing, not active, or already
    /// carrying an invoice for the period is reported as a failed item while
    /// the rest are created.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is invalid, the period does not belong
    /// to the tenant, or a transaction fails.
    pub async fn generate_invoices(
        &self,
        tenant_id: Uuid,
        input: GenerateInvoicesInput,
    ) -> Result<BatchOutcome<invoices::Model, Uuid>, AppError> {
        LedgerService::validate_amount(input.amount).map_err(AppError::from)?;

        academic_periods::Entity::find()
            .filter(academic_periods::Column::Id.eq(input.period_id))
            .filter(academic_periods::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or(LedgerError::PeriodNotFound(input.period_id))?;

        let period_id = input.period_id;
        let amount = input.amount;
        let due_date = input.due_date;
        let description = input.description;

        batch::run(
            self.db.as_ref(),
            Atomicity::PerItem,
            input.enrollment_ids,
            |id| *id,
            move |txn, enrollment_id| {
                Box::pin(generate_one(
                    txn,
                    tenant_id,
                    enrollment_id,
                    period_id,
                    description.clone(),
                    amount,
                    due_date,
                ))
            },
        )
        .await
    }

    /// Applies a payment to an invoice and records the payment row.
    ///
    /// The invoice row is locked for the duration of the transaction, so
    /// concurrent payments serialize and overshoot is caught against the
    /// committed balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice is missing, cancelled, or the payment
    /// would exceed the outstanding balance.
    pub async fn record_payment(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
        input: RecordPaymentInput,
    ) -> Result<PaymentReceipt, InvoiceRepoError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find()
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::InvoiceNotFound(invoice_id))?;

        let state = invoice_state(&invoice);
        let today = Utc::now().date_naive();
        let application = LedgerService::apply_payment(&state, input.amount, today)?;

        let now = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            invoice_id: Set(invoice_id),
            amount: Set(input.amount),
            method: Set(input.method.into()),
            reference: Set(input.reference),
            notes: Set(input.notes),
            paid_on: Set(input.paid_on),
            recorded_by: Set(input.recorded_by),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.paid_amount = Set(application.new_paid_amount);
        active.balance = Set(application.new_balance);
        active.status = Set(application.new_status.into());
        active.updated_at = Set(now.into());
        let invoice = active.update(&txn).await?;

        txn.commit().await?;
        Ok(PaymentReceipt { invoice, payment })
    }

    /// Fetches a single invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` for missing or cross-tenant invoices.
    pub async fn get_invoice(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<invoices::Model, InvoiceRepoError> {
        invoices::Entity::find()
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| LedgerError::InvoiceNotFound(invoice_id).into())
    }

    /// Lists invoices matching the filter, newest first.
    ///
    /// Returns the page of rows and the total match count.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_invoices(
        &self,
        tenant_id: Uuid,
        filter: InvoiceFilter,
        page: &PageRequest,
    ) -> Result<(Vec<invoices::Model>, u64), InvoiceRepoError> {
        let mut query = invoices::Entity::find()
            .filter(invoices::Column::TenantId.eq(tenant_id));

        if let Some(status) = filter.status {
            let status: sea_orm_active_enums::InvoiceStatus = status.into();
            query = query.filter(invoices::Column::Status.eq(status));
        }
        if let Some(period_id) = filter.period_id {
            query = query.filter(invoices::Column::PeriodId.eq(period_id));
        }
        if let Some(student_id) = filter.student_id {
            query = query.filter(invoices::Column::StudentId.eq(student_id));
        }
        if let Some(enrollment_id) = filter.enrollment_id {
            query = query.filter(invoices::Column::EnrollmentId.eq(enrollment_id));
        }

        let total = query.clone().count(self.db.as_ref()).await?;
        let rows = query
            .order_by_desc(invoices::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(self.db.as_ref())
            .await?;

        Ok((rows, total))
    }

    /// Lists the payments applied to an invoice, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` for missing or cross-tenant invoices.
    pub async fn list_payments(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Vec<payments::Model>, InvoiceRepoError> {
        invoices::Entity::find()
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .one(self.db.as_ref())
            .await?
            .ok_or(LedgerError::InvoiceNotFound(invoice_id))?;

        let rows = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payments::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;
        Ok(rows)
    }

    /// Overrides an invoice's status, subject to consistency rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the new status contradicts the stored balance.
    pub async fn update_status(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
        new_status: InvoiceStatus,
    ) -> Result<invoices::Model, InvoiceRepoError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find()
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::InvoiceNotFound(invoice_id))?;

        let state = invoice_state(&invoice);
        LedgerService::validate_status_override(&state, new_status)?;

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(new_status.into());
        active.updated_at = Set(Utc::now().into());
        let invoice = active.update(&txn).await?;

        txn.commit().await?;
        Ok(invoice)
    }

    /// Deletes an invoice with no payments. Invoices with payments must be
    /// cancelled instead.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceHasPayments` if any payment references the invoice.
    pub async fn delete_invoice(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<(), InvoiceRepoError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find()
            .filter(invoices::Column::Id.eq(invoice_id))
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(LedgerError::InvoiceNotFound(invoice_id))?;

        let payment_count = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .count(&txn)
            .await?;
        if payment_count > 0 {
            return Err(LedgerError::InvoiceHasPayments(invoice_id).into());
        }

        invoices::Entity::delete_by_id(invoice.id).exec(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Aggregates the tenant's financial position, optionally per period.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn financial_summary(
        &self,
        tenant_id: Uuid,
        period_id: Option<Uuid>,
    ) -> Result<FinancialSummary, InvoiceRepoError> {
        let mut query = invoices::Entity::find()
            .filter(invoices::Column::TenantId.eq(tenant_id));
        if let Some(period_id) = period_id {
            query = query.filter(invoices::Column::PeriodId.eq(period_id));
        }

        let rows = query.all(self.db.as_ref()).await?;
        Ok(FinancialSummary::from_rows(rows.into_iter().map(|r| {
            (r.amount, r.paid_amount, r.balance, r.status.into())
        })))
    }

    /// Marks unpaid invoices past their due date as overdue.
    ///
    /// Returns the number of invoices updated.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn refresh_overdue(
        &self,
        tenant_id: Uuid,
        period_id: Option<Uuid>,
        today: NaiveDate,
    ) -> Result<u64, InvoiceRepoError> {
        let mut update = invoices::Entity::update_many()
            .col_expr(
                invoices::Column::Status,
                sea_orm_active_enums::InvoiceStatus::Overdue.as_enum(),
            )
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .filter(invoices::Column::Status.is_in([
                sea_orm_active_enums::InvoiceStatus::Pending,
                sea_orm_active_enums::InvoiceStatus::Partial,
            ]))
            .filter(invoices::Column::DueDate.lt(today));
        if let Some(period_id) = period_id {
            update = update.filter(invoices::Column::PeriodId.eq(period_id));
        }

        let result = update.exec(self.db.as_ref()).await?;
        Ok(result.rows_affected)
    }
}

async fn generate_one(
    txn: &sea_orm::DatabaseTransaction,
    tenant_id: Uuid,
    enrollment_id: Uuid,
    period_id: Uuid,
    description: String,
    amount: Decimal,
    due_date: Option<NaiveDate>,
) -> Result<invoices::Model, AppError> {
    let db_err = |e: DbErr| AppError::Database(e.to_string());

    let enrollment = enrollments::Entity::find()
        .filter(enrollments::Column::Id.eq(enrollment_id))
        .filter(enrollments::Column::TenantId.eq(tenant_id))
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or(LedgerError::EnrollmentNotFound(enrollment_id))?;
    if enrollment.status != sea_orm_active_enums::EnrollmentStatus::Active {
        return Err(LedgerError::EnrollmentNotActive(enrollment_id).into());
    }

    let existing = invoices::Entity::find()
        .filter(invoices::Column::EnrollmentId.eq(enrollment_id))
        .filter(invoices::Column::PeriodId.eq(period_id))
        .count(txn)
        .await
        .map_err(db_err)?;
    if existing > 0 {
        return Err(LedgerError::DuplicateInvoice { enrollment_id }.into());
    }

    let state = InvoiceState::new(amount, due_date);
    let now = Utc::now();
    invoices::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        student_id: Set(enrollment.student_id),
        enrollment_id: Set(enrollment_id),
        period_id: Set(period_id),
        description: Set(description),
        amount: Set(state.amount),
        paid_amount: Set(state.paid_amount),
        balance: Set(state.balance),
        status: Set(state.status.into()),
        due_date: Set(due_date),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(txn)
    .await
    .map_err(|e| map_unique_violation(e, || LedgerError::DuplicateInvoice { enrollment_id }))
}

/// Projects an invoice row into the ledger state snapshot.
fn invoice_state(invoice: &invoices::Model) -> InvoiceState {
    InvoiceState {
        amount: invoice.amount,
        paid_amount: invoice.paid_amount,
        balance: invoice.balance,
        status: invoice.status.into(),
        due_date: invoice.due_date,
    }
}

/// Maps a unique-constraint violation to a domain conflict.
fn map_unique_violation(err: DbErr, conflict: impl FnOnce() -> LedgerError) -> AppError {
    match err.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => conflict().into(),
        _ => AppError::Database(err.to_string()),
    }
}

#[cfg(test)]
#[path = "invoice_tests.rs"]
mod tests;

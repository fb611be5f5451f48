//! Invoice and payment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::middleware::Caller;
use crate::routes::{ApiError, audit, scoped_tenant};
use crate::AppState;
use scolara_core::audit::{AuditAction, AuditEvent};
use scolara_core::authz::check_role;
use scolara_core::ledger::{InvoiceStatus, PaymentMethod};
use scolara_db::entities::{invoices, payments};
use scolara_db::repositories::invoice::{
    GenerateInvoicesInput, InvoiceFilter, InvoiceRepository, RecordPaymentInput,
};
use scolara_db::TenantRepository;
use scolara_shared::{PageRequest, PageResponse, Role};

const FINANCE_WRITE: &[Role] = &[Role::Admin, Role::Accountant];
const FINANCE_READ: &[Role] = &[
    Role::Admin,
    Role::Accountant,
    Role::Registrar,
    Role::Teacher,
    Role::Viewer,
];

/// Creates the invoice routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices/generate", post(generate_invoices))
        .route("/invoices", get(list_invoices))
        .route("/invoices/{id}", get(get_invoice))
        .route("/invoices/{id}", delete(delete_invoice))
        .route("/invoices/{id}/status", patch(update_invoice_status))
        .route("/invoices/{id}/payments", post(record_payment))
        .route("/invoices/{id}/payments", get(list_payments))
        .route("/finance/summary", get(financial_summary))
        .route("/finance/refresh-overdue", post(refresh_overdue))
}

/// Request body for generating invoices.
#[derive(Debug, Deserialize)]
pub struct GenerateInvoicesRequest {
    /// The enrollments to invoice.
    pub enrollment_ids: Vec<Uuid>,
    /// Period the charges belong to. Defaults to the tenant's current period.
    pub period_id: Option<Uuid>,
    /// Invoice description.
    pub description: String,
    /// Amount charged per enrollment.
    pub amount: Decimal,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Payment amount.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// External reference.
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Date the payment was made. Defaults to today.
    pub paid_on: Option<NaiveDate>,
}

/// Request body for overriding an invoice's status.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceStatusRequest {
    /// The new status.
    pub status: InvoiceStatus,
}

/// Query parameters for listing invoices.
///
/// Pagination fields are inlined rather than flattened; `serde_urlencoded`
/// cannot deserialize numeric fields through `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
pub struct ListInvoicesQuery {
    /// Filter by status.
    pub status: Option<InvoiceStatus>,
    /// Filter by period.
    pub period_id: Option<Uuid>,
    /// Filter by student.
    pub student_id: Option<Uuid>,
    /// Filter by enrollment.
    pub enrollment_id: Option<Uuid>,
    /// Zero-based page number.
    #[serde(default)]
    pub page: u64,
    /// Requested page size.
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_per_page() -> u64 {
    scolara_shared::types::pagination::DEFAULT_PAGE_SIZE
}

/// Query parameters for the financial summary.
#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    /// Restrict the summary to one period.
    pub period_id: Option<Uuid>,
}

/// Response shape for an invoice.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// The billed student.
    pub student_id: Uuid,
    /// The enrollment the invoice charges.
    pub enrollment_id: Uuid,
    /// The period the charge belongs to.
    pub period_id: Uuid,
    /// Description.
    pub description: String,
    /// Amount charged.
    pub amount: Decimal,
    /// Amount paid so far.
    pub paid_amount: Decimal,
    /// Outstanding balance.
    pub balance: Decimal,
    /// Current status.
    pub status: InvoiceStatus,
    /// Due date, if any.
    pub due_date: Option<NaiveDate>,
}

impl From<invoices::Model> for InvoiceResponse {
    fn from(m: invoices::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            enrollment_id: m.enrollment_id,
            period_id: m.period_id,
            description: m.description,
            amount: m.amount,
            paid_amount: m.paid_amount,
            balance: m.balance,
            status: m.status.into(),
            due_date: m.due_date,
        }
    }
}

/// POST `/invoices/generate` - Create one invoice per requested enrollment.
async fn generate_invoices(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(payload): Json<GenerateInvoicesRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let period_id = match payload.period_id {
        Some(period_id) => period_id,
        None => {
            TenantRepository::new(state.db.clone())
                .current_period(tenant_id)
                .await?
        }
    };

    let repo = InvoiceRepository::new(state.db.clone());
    let outcome = repo
        .generate_invoices(
            tenant_id,
            GenerateInvoicesInput {
                enrollment_ids: payload.enrollment_ids,
                period_id,
                description: payload.description,
                amount: payload.amount,
                due_date: payload.due_date,
            },
        )
        .await?;

    info!(
        tenant_id = %tenant_id,
        period_id = %period_id,
        created = outcome.success_count(),
        failed = outcome.error_count(),
        "invoice generation run finished"
    );
    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Create,
            "invoice_batch",
            period_id,
        )
        .with_after(json!({
            "created": outcome.success_count(),
            "failed": outcome.error_count(),
        })),
    )
    .await;

    let created: Vec<InvoiceResponse> =
        outcome.succeeded.into_iter().map(Into::into).collect();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "created": created,
            "errors": outcome.errors,
        })),
    )
        .into_response())
}

/// GET `/invoices` - List invoices, newest first.
async fn list_invoices(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_READ)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    let repo = InvoiceRepository::new(state.db.clone());
    let (rows, total) = repo
        .list_invoices(
            tenant_id,
            InvoiceFilter {
                status: query.status,
                period_id: query.period_id,
                student_id: query.student_id,
                enrollment_id: query.enrollment_id,
            },
            &page,
        )
        .await?;

    let items: Vec<InvoiceResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(PageResponse::new(items, page, total)).into_response())
}

/// GET `/invoices/{id}` - Fetch a single invoice.
async fn get_invoice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(invoice_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_READ)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = InvoiceRepository::new(state.db.clone());
    let invoice = repo.get_invoice(tenant_id, invoice_id).await?;
    Ok(Json(InvoiceResponse::from(invoice)).into_response())
}

/// POST `/invoices/{id}/payments` - Apply a payment.
async fn record_payment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = InvoiceRepository::new(state.db.clone());
    let receipt = repo
        .record_payment(
            tenant_id,
            invoice_id,
            RecordPaymentInput {
                amount: payload.amount,
                method: payload.method,
                reference: payload.reference,
                notes: payload.notes,
                paid_on: payload.paid_on.unwrap_or_else(|| Utc::now().date_naive()),
                recorded_by: ctx.caller_id,
            },
        )
        .await?;

    info!(
        tenant_id = %tenant_id,
        invoice_id = %invoice_id,
        payment_id = %receipt.payment.id,
        amount = %receipt.payment.amount,
        "payment recorded"
    );
    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Payment,
            "invoice",
            invoice_id,
        )
        .with_after(json!({
            "payment_id": receipt.payment.id,
            "amount": receipt.payment.amount,
            "balance": receipt.invoice.balance,
        })),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "payment_id": receipt.payment.id,
            "invoice": InvoiceResponse::from(receipt.invoice),
        })),
    )
        .into_response())
}

/// Response shape for a payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Amount applied.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// External reference.
    pub reference: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Date the payment was made.
    pub paid_on: NaiveDate,
    /// The user who recorded it.
    pub recorded_by: Uuid,
}

impl From<payments::Model> for PaymentResponse {
    fn from(m: payments::Model) -> Self {
        Self {
            id: m.id,
            amount: m.amount,
            method: m.method.into(),
            reference: m.reference,
            notes: m.notes,
            paid_on: m.paid_on,
            recorded_by: m.recorded_by,
        }
    }
}

/// GET `/invoices/{id}/payments` - List an invoice's payments, oldest first.
async fn list_payments(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(invoice_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_READ)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = InvoiceRepository::new(state.db.clone());
    let rows = repo.list_payments(tenant_id, invoice_id).await?;
    let items: Vec<PaymentResponse> = rows.into_iter().map(Into::into).collect();
    Ok(Json(json!({ "items": items })).into_response())
}

/// PATCH `/invoices/{id}/status` - Override the invoice status.
async fn update_invoice_status(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceStatusRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = InvoiceRepository::new(state.db.clone());
    let invoice = repo
        .update_status(tenant_id, invoice_id, payload.status)
        .await?;

    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Update,
            "invoice",
            invoice_id,
        )
        .with_after(json!({ "status": payload.status })),
    )
    .await;

    Ok(Json(InvoiceResponse::from(invoice)).into_response())
}

/// DELETE `/invoices/{id}` - Delete an invoice with no payments.
async fn delete_invoice(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(invoice_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = InvoiceRepository::new(state.db.clone());
    repo.delete_invoice(tenant_id, invoice_id).await?;

    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Delete,
            "invoice",
            invoice_id,
        ),
    )
    .await;

    Ok(StatusCode::NO_CONTENT.into_response())
}

/// GET `/finance/summary` - Aggregate financial position.
async fn financial_summary(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_READ)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = InvoiceRepository::new(state.db.clone());
    let summary = repo.financial_summary(tenant_id, query.period_id).await?;
    Ok(Json(summary).into_response())
}

/// POST `/finance/refresh-overdue` - Flag unpaid invoices past their due date.
async fn refresh_overdue(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, ApiError> {
    check_role(&ctx, FINANCE_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = InvoiceRepository::new(state.db.clone());
    let updated = repo
        .refresh_overdue(tenant_id, query.period_id, Utc::now().date_naive())
        .await?;

    info!(tenant_id = %tenant_id, updated, "overdue refresh finished");
    Ok(Json(json!({ "updated": updated })).into_response())
}

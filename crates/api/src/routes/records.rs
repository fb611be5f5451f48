//! Bulk result and attendance routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::middleware::Caller;
use crate::routes::{ApiError, scoped_tenant};
use crate::AppState;
use scolara_core::authz::check_role;
use scolara_core::batch::Atomicity;
use scolara_core::enrollment::AttendanceStatus;
use scolara_db::repositories::records::{AttendanceInput, RecordsRepository, ResultInput};
use scolara_shared::Role;

const RECORDS_WRITE: &[Role] = &[Role::Admin, Role::Registrar, Role::Teacher];

/// Creates the record routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/results/bulk", post(bulk_record_results))
        .route("/attendance/bulk", post(bulk_record_attendance))
}

/// One subject result in a bulk request.
#[derive(Debug, Deserialize)]
pub struct ResultItem {
    /// Target enrollment.
    pub enrollment_id: Uuid,
    /// Subject name.
    pub subject: String,
    /// Score as a percentage.
    pub score: Decimal,
    /// Optional letter grade.
    pub grade: Option<String>,
}

/// Request body for bulk result entry.
#[derive(Debug, Deserialize)]
pub struct BulkResultsRequest {
    /// The results to record.
    pub items: Vec<ResultItem>,
    /// Failure policy. Defaults to per-item.
    pub atomicity: Option<Atomicity>,
}

/// One attendance record in a bulk request.
#[derive(Debug, Deserialize)]
pub struct AttendanceItem {
    /// Target enrollment.
    pub enrollment_id: Uuid,
    /// The day being recorded.
    pub recorded_on: NaiveDate,
    /// Attendance status.
    pub status: AttendanceStatus,
}

/// Request body for bulk attendance entry.
#[derive(Debug, Deserialize)]
pub struct BulkAttendanceRequest {
    /// The attendance records.
    pub items: Vec<AttendanceItem>,
    /// Failure policy. Defaults to per-item.
    pub atomicity: Option<Atomicity>,
}

/// POST `/results/bulk` - Record subject results in bulk.
async fn bulk_record_results(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(payload): Json<BulkResultsRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, RECORDS_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let inputs: Vec<ResultInput> = payload
        .items
        .into_iter()
        .map(|item| ResultInput {
            enrollment_id: item.enrollment_id,
            subject: item.subject,
            score: item.score,
            grade: item.grade,
        })
        .collect();

    let repo = RecordsRepository::new(state.db.clone());
    let outcome = repo
        .bulk_record_results(
            tenant_id,
            inputs,
            ctx.caller_id,
            payload.atomicity.unwrap_or(Atomicity::PerItem),
        )
        .await?;

    info!(
        tenant_id = %tenant_id,
        recorded = outcome.success_count(),
        failed = outcome.error_count(),
        "bulk result entry finished"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "recorded": outcome.success_count(),
            "errors": outcome.errors,
        })),
    )
        .into_response())
}

/// POST `/attendance/bulk` - Record attendance in bulk.
async fn bulk_record_attendance(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(payload): Json<BulkAttendanceRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, RECORDS_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let inputs: Vec<AttendanceInput> = payload
        .items
        .into_iter()
        .map(|item| AttendanceInput {
            enrollment_id: item.enrollment_id,
            recorded_on: item.recorded_on,
            status: item.status,
        })
        .collect();

    let repo = RecordsRepository::new(state.db.clone());
    let outcome = repo
        .bulk_record_attendance(
            tenant_id,
            inputs,
            ctx.caller_id,
            payload.atomicity.unwrap_or(Atomicity::PerItem),
        )
        .await?;

    info!(
        tenant_id = %tenant_id,
        recorded = outcome.success_count(),
        failed = outcome.error_count(),
        "bulk attendance entry finished"
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "recorded": outcome.success_count(),
            "errors": outcome.errors,
        })),
    )
        .into_response())
}

//! Enrollment lifecycle routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, post},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::middleware::Caller;
use crate::routes::{ApiError, audit, scoped_tenant};
use crate::AppState;
use scolara_core::audit::{AuditAction, AuditEvent};
use scolara_core::authz::check_role;
use scolara_core::batch::Atomicity;
use scolara_core::enrollment::EnrollmentStatus;
use scolara_db::entities::enrollments;
use scolara_db::repositories::enrollment::{
    CreateEnrollmentInput, EnrollmentRepository, PromoteInput, TransferInput,
};
use scolara_db::TenantRepository;
use scolara_shared::Role;

const ENROLLMENT_WRITE: &[Role] = &[Role::Admin, Role::Registrar];

/// Creates the enrollment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/enrollments", post(create_enrollment))
        .route("/enrollments/bulk", post(bulk_create_enrollments))
        .route("/enrollments/promote", post(promote_enrollments))
        .route("/enrollments/{id}", delete(delete_enrollment))
        .route("/enrollments/{id}/transfer", post(transfer_enrollment))
        .route("/enrollments/{id}/drop", post(drop_enrollment))
        .route("/enrollments/{id}/complete", post(complete_enrollment))
        .route("/enrollments/{id}/reactivate", post(reactivate_enrollment))
}

/// Request body for enrolling a student.
#[derive(Debug, Deserialize)]
pub struct CreateEnrollmentRequest {
    /// The student to enrol.
    pub student_id: Uuid,
    /// The academic period. Defaults to the tenant's current period.
    pub period_id: Option<Uuid>,
    /// The class within the period.
    pub class_id: Uuid,
    /// Enrollment date. Defaults to today.
    pub enrolled_on: Option<NaiveDate>,
}

/// Request body for bulk enrollment.
#[derive(Debug, Deserialize)]
pub struct BulkEnrollmentRequest {
    /// The enrollments to create.
    pub items: Vec<CreateEnrollmentRequest>,
    /// Failure policy. Defaults to per-item.
    pub atomicity: Option<Atomicity>,
}

/// Request body for transferring an enrollment.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Class to move the enrollment into.
    pub target_class_id: Uuid,
}

/// Request body for a promotion run.
#[derive(Debug, Deserialize)]
pub struct PromoteRequest {
    /// The students to promote.
    pub student_ids: Vec<Uuid>,
    /// Period the new enrollments are created in.
    pub target_period_id: Uuid,
    /// Class the new enrollments are created in.
    pub target_class_id: Uuid,
    /// Whether currently active enrollments are completed. Defaults to true.
    pub mark_previous_as_completed: Option<bool>,
    /// Enrollment date stamped on the new enrollments. Defaults to today.
    pub enrolled_on: Option<NaiveDate>,
}

/// Response shape for an enrollment.
#[derive(Debug, Serialize)]
pub struct EnrollmentResponse {
    /// Enrollment ID.
    pub id: Uuid,
    /// The enrolled student.
    pub student_id: Uuid,
    /// The academic period.
    pub period_id: Uuid,
    /// The class.
    pub class_id: Uuid,
    /// Current status.
    pub status: EnrollmentStatus,
    /// Enrollment date.
    pub enrolled_on: NaiveDate,
}

impl From<enrollments::Model> for EnrollmentResponse {
    fn from(m: enrollments::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            period_id: m.period_id,
            class_id: m.class_id,
            status: m.status.into(),
            enrolled_on: m.enrolled_on,
        }
    }
}

async fn resolve_input(
    state: &AppState,
    tenant_id: Uuid,
    request: CreateEnrollmentRequest,
) -> Result<CreateEnrollmentInput, ApiError> {
    let period_id = match request.period_id {
        Some(period_id) => period_id,
        None => {
            TenantRepository::new(state.db.clone())
                .current_period(tenant_id)
                .await?
        }
    };
    Ok(CreateEnrollmentInput {
        student_id: request.student_id,
        period_id,
        class_id: request.class_id,
        enrolled_on: request.enrolled_on.unwrap_or_else(|| Utc::now().date_naive()),
    })
}

/// POST `/enrollments` - Enrol a student.
async fn create_enrollment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(payload): Json<CreateEnrollmentRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, ENROLLMENT_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let input = resolve_input(&state, tenant_id, payload).await?;
    let repo = EnrollmentRepository::new(state.db.clone());
    let enrollment = repo.create_enrollment(tenant_id, input).await?;

    info!(
        tenant_id = %tenant_id,
        enrollment_id = %enrollment.id,
        student_id = %enrollment.student_id,
        "student enrolled"
    );
    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Create,
            "enrollment",
            enrollment.id,
        ),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(EnrollmentResponse::from(enrollment)),
    )
        .into_response())
}

/// POST `/enrollments/bulk` - Enrol many students.
async fn bulk_create_enrollments(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(payload): Json<BulkEnrollmentRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, ENROLLMENT_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let mut inputs = Vec::with_capacity(payload.items.len());
    for item in payload.items {
        inputs.push(resolve_input(&state, tenant_id, item).await?);
    }

    let repo = EnrollmentRepository::new(state.db.clone());
    let outcome = repo
        .bulk_create(
            tenant_id,
            inputs,
            payload.atomicity.unwrap_or(Atomicity::PerItem),
        )
        .await?;

    info!(
        tenant_id = %tenant_id,
        created = outcome.success_count(),
        failed = outcome.error_count(),
        "bulk enrollment run finished"
    );

    let created: Vec<EnrollmentResponse> =
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

/// POST `/enrollments/{id}/transfer` - Move an enrollment to another class.
async fn transfer_enrollment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(enrollment_id): Path<Uuid>,
    Json(payload): Json<TransferRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, ENROLLMENT_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = EnrollmentRepository::new(state.db.clone());
    let enrollment = repo
        .transfer(
            tenant_id,
            enrollment_id,
            TransferInput {
                target_class_id: payload.target_class_id,
            },
        )
        .await?;

    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Transfer,
            "enrollment",
            enrollment_id,
        )
        .with_after(json!({ "class_id": enrollment.class_id })),
    )
    .await;

    Ok(Json(EnrollmentResponse::from(enrollment)).into_response())
}

/// POST `/enrollments/{id}/drop` - Drop an active enrollment.
async fn drop_enrollment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(enrollment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    check_role(&ctx, ENROLLMENT_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = EnrollmentRepository::new(state.db.clone());
    let enrollment = repo.drop_enrollment(tenant_id, enrollment_id).await?;

    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Drop,
            "enrollment",
            enrollment_id,
        ),
    )
    .await;

    Ok(Json(EnrollmentResponse::from(enrollment)).into_response())
}

/// POST `/enrollments/{id}/complete` - Complete an active enrollment.
async fn complete_enrollment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(enrollment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    check_role(&ctx, ENROLLMENT_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = EnrollmentRepository::new(state.db.clone());
    let enrollment = repo.complete(tenant_id, enrollment_id).await?;

    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Update,
            "enrollment",
            enrollment_id,
        )
        .with_after(json!({ "status": enrollment.status })),
    )
    .await;

    Ok(Json(EnrollmentResponse::from(enrollment)).into_response())
}

/// POST `/enrollments/{id}/reactivate` - Reactivate a terminal enrollment.
async fn reactivate_enrollment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(enrollment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    check_role(&ctx, ENROLLMENT_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = EnrollmentRepository::new(state.db.clone());
    let enrollment = repo.reactivate(tenant_id, enrollment_id).await?;

    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Reactivate,
            "enrollment",
            enrollment_id,
        ),
    )
    .await;

    Ok(Json(EnrollmentResponse::from(enrollment)).into_response())
}

/// POST `/enrollments/promote` - Promote students into a new period, atomically.
async fn promote_enrollments(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(payload): Json<PromoteRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, ENROLLMENT_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = EnrollmentRepository::new(state.db.clone());
    let report = repo
        .promote(
            tenant_id,
            PromoteInput {
                student_ids: payload.student_ids,
                target_period_id: payload.target_period_id,
                target_class_id: payload.target_class_id,
                mark_previous_as_completed: payload.mark_previous_as_completed.unwrap_or(true),
                enrolled_on: payload.enrolled_on.unwrap_or_else(|| Utc::now().date_naive()),
            },
        )
        .await?;

    info!(
        tenant_id = %tenant_id,
        target_period = %payload.target_period_id,
        target_class = %payload.target_class_id,
        promoted = report.promoted,
        "promotion run finished"
    );
    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Promote,
            "period",
            payload.target_period_id,
        )
        .with_metadata(json!({
            "target_class_id": payload.target_class_id,
            "promoted": report.promoted,
        })),
    )
    .await;

    let enrollments: Vec<EnrollmentResponse> =
        report.enrollments.into_iter().map(Into::into).collect();
    Ok(Json(json!({
        "promoted": report.promoted,
        "enrollments": enrollments,
    }))
    .into_response())
}

/// DELETE `/enrollments/{id}` - Delete an enrollment with no dependent records.
async fn delete_enrollment(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Path(enrollment_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    check_role(&ctx, ENROLLMENT_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = EnrollmentRepository::new(state.db.clone());
    repo.delete_enrollment(tenant_id, enrollment_id).await?;

    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Delete,
            "enrollment",
            enrollment_id,
        ),
    )
    .await;

    Ok(StatusCode::NO_CONTENT.into_response())
}

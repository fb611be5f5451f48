//! Academic period routes.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::put,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::middleware::Caller;
use crate::routes::{ApiError, audit, scoped_tenant};
use crate::AppState;
use scolara_core::audit::{AuditAction, AuditEvent};
use scolara_core::authz::check_role;
use scolara_db::TenantRepository;
use scolara_shared::Role;

const PERIOD_WRITE: &[Role] = &[Role::Admin];

/// Creates the period routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/periods/current", put(set_current_period))
}

/// Request body for pointing the tenant at a new current period.
#[derive(Debug, Deserialize)]
pub struct SetCurrentPeriodRequest {
    /// The period to make current.
    pub period_id: Uuid,
}

/// PUT `/periods/current` - Set the tenant's current period.
async fn set_current_period(
    State(state): State<AppState>,
    Caller(ctx): Caller,
    Json(payload): Json<SetCurrentPeriodRequest>,
) -> Result<Response, ApiError> {
    check_role(&ctx, PERIOD_WRITE)?;
    let tenant_id = scoped_tenant(&ctx)?;

    let repo = TenantRepository::new(state.db.clone());
    let tenant = repo.set_current_period(tenant_id, payload.period_id).await?;

    info!(
        tenant_id = %tenant_id,
        period_id = %payload.period_id,
        "current period updated"
    );
    audit(
        &state,
        AuditEvent::new(
            Some(tenant_id),
            ctx.caller_id,
            AuditAction::Update,
            "tenant",
            tenant_id,
        )
        .with_after(json!({ "current_period_id": payload.period_id })),
    )
    .await;

    Ok(Json(json!({
        "tenant_id": tenant.id,
        "current_period_id": tenant.current_period_id,
    }))
    .into_response())
}

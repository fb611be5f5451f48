//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, middleware::auth::auth_middleware};
use scolara_core::audit::AuditEvent;
use scolara_db::AuditRepository;
use scolara_shared::{AppError, TenantContext};

pub mod enrollments;
pub mod health;
pub mod invoices;
pub mod periods;
pub mod records;

/// Creates the API router with protected routes that need state for middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Protected routes that require authentication
    let protected_routes = Router::new()
        .merge(invoices::routes())
        .merge(enrollments::routes())
        .merge(records::routes())
        .merge(periods::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new().merge(health::routes()).merge(protected_routes)
}

/// Error wrapper so handlers can use `?` and still produce the standard
/// `{ "error": code, "message": text }` envelope.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

impl<E: Into<AppError>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Resolves the tenant every tenant-scoped handler operates on.
///
/// Platform operators act on a tenant by minting a token scoped to it; a
/// token with no tenant cannot address tenant-scoped resources.
pub(crate) fn scoped_tenant(ctx: &TenantContext) -> Result<Uuid, AppError> {
    ctx.tenant_id.ok_or_else(|| {
        AppError::Validation("A tenant-scoped token is required for this operation".to_string())
    })
}

/// Writes an audit event, best-effort.
pub(crate) async fn audit(state: &AppState, event: AuditEvent) {
    AuditRepository::new(state.db.clone()).record(event).await;
}

//! Authorization gate: role and tenant-ownership checks.
//!
//! Every entry point in the ledger and enrollment engines calls this gate
//! before touching storage. A failed check produces `Forbidden` and no side
//! effect. Tenant visibility of individual rows is additionally enforced by
//! same-query tenant filters in the repositories; this gate covers the
//! caller's standing to attempt the operation at all.
//!
//! The HTTP layer calls [`check_role`] on every route and resolves the
//! acting tenant from the token itself, so row-level isolation rides on the
//! repositories' tenant filters. [`check_tenant_access`] and
//! [`check_can_manage_role`] state the contract for callers that address a
//! target tenant or identity explicitly; identity administration lives
//! outside this service, so within it they are the pure contract surface,
//! covered by the property suite in this module.

use scolara_shared::{AppError, Role, TenantContext};
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
mod props;

/// Errors produced by the authorization gate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthzError {
    /// The caller's role is not in the allowed set for the operation.
    #[error("role {0} is not permitted to perform this operation")]
    RoleNotPermitted(Role),

    /// The caller's tenant does not match the target tenant.
    #[error("caller does not belong to the target tenant")]
    TenantMismatch,

    /// A tenant-scoped role was presented without a tenant id.
    #[error("a tenant id is required for this role")]
    MissingTenant,

    /// Only the platform role may act across tenants or without a tenant.
    #[error("only the platform role may act without a tenant")]
    CrossTenantNotAllowed,

    /// A caller may never manage a role at or above their own privilege.
    #[error("cannot manage a role with privilege greater than or equal to your own")]
    InsufficientPrivilege,
}

impl From<AuthzError> for AppError {
    fn from(err: AuthzError) -> Self {
        Self::Forbidden(err.to_string())
    }
}

/// Checks that the caller's role is one of the allowed roles.
///
/// The platform role always passes: it is strictly more privileged than any
/// tenant role.
///
/// # Errors
///
/// Returns `AuthzError::RoleNotPermitted` otherwise.
pub fn check_role(ctx: &TenantContext, allowed: &[Role]) -> Result<(), AuthzError> {
    if ctx.role.is_platform() || allowed.contains(&ctx.role) {
        Ok(())
    } else {
        Err(AuthzError::RoleNotPermitted(ctx.role))
    }
}

/// Checks that the caller may act on the given target tenant.
///
/// Rules:
/// - the platform role may act on any tenant, or with no tenant at all;
/// - every other role must carry a tenant id equal to the target.
///
/// # Errors
///
/// Returns a `Forbidden`-kind error when the check fails.
pub fn check_tenant_access(
    ctx: &TenantContext,
    target_tenant_id: Option<Uuid>,
) -> Result<(), AuthzError> {
    if ctx.role.is_platform() {
        return Ok(());
    }

    let Some(caller_tenant) = ctx.tenant_id else {
        return Err(AuthzError::MissingTenant);
    };

    match target_tenant_id {
        Some(target) if target == caller_tenant => Ok(()),
        Some(_) => Err(AuthzError::TenantMismatch),
        // Only the platform role may address a tenant-less target.
        None => Err(AuthzError::CrossTenantNotAllowed),
    }
}

/// Checks that the caller may grant, revoke, or modify the target role.
///
/// Elevation is role-directional: a caller may only manage roles of strictly
/// lower privilege than their own. Identities with no tenant binding are
/// platform-only territory.
///
/// # Errors
///
/// Returns a `Forbidden`-kind error when the check fails.
pub fn check_can_manage_role(
    ctx: &TenantContext,
    target_role: Role,
    target_tenant_id: Option<Uuid>,
) -> Result<(), AuthzError> {
    if target_tenant_id.is_none() && !ctx.role.is_platform() {
        return Err(AuthzError::CrossTenantNotAllowed);
    }
    if target_role.rank() >= ctx.role.rank() && !ctx.role.is_platform() {
        return Err(AuthzError::InsufficientPrivilege);
    }
    check_tenant_access(ctx, target_tenant_id)
}

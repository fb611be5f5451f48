//! Caller context: the resolved identity every operation trusts.
//!
//! The identity resolver (JWT middleware in this deployment) produces a
//! `TenantContext` before any core call. The core performs no independent
//! authentication; this value is the trust boundary for every check.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User roles within the platform.
///
/// `PlatformAdmin` is the only role that may act without a tenant (and
/// across tenants); every other role is bound to exactly one school.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator. Cross-tenant access, may hold no tenant id.
    PlatformAdmin,
    /// School administrator. Full access within their school.
    Admin,
    /// Can manage invoices, payments, and financial summaries.
    Accountant,
    /// Can manage enrollments, promotions, and transfers.
    Registrar,
    /// Can record results and attendance for their classes.
    Teacher,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Privilege rank used for role-directional elevation checks.
    ///
    /// A caller may never grant, revoke, or modify a role with a rank
    /// greater than or equal to their own (except themselves via
    /// `PlatformAdmin`).
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::PlatformAdmin => 5,
            Self::Admin => 4,
            Self::Accountant => 3,
            Self::Registrar => 2,
            Self::Teacher => 1,
            Self::Viewer => 0,
        }
    }

    /// Returns true if this role may act without a tenant id.
    #[must_use]
    pub const fn is_platform(&self) -> bool {
        matches!(self, Self::PlatformAdmin)
    }

    /// Returns true if this role can manage invoices and payments.
    #[must_use]
    pub const fn can_manage_finances(&self) -> bool {
        matches!(self, Self::PlatformAdmin | Self::Admin | Self::Accountant)
    }

    /// Returns true if this role can manage enrollments and promotions.
    #[must_use]
    pub const fn can_manage_enrollments(&self) -> bool {
        matches!(self, Self::PlatformAdmin | Self::Admin | Self::Registrar)
    }

    /// Returns true if this role can record results and attendance.
    #[must_use]
    pub const fn can_record_academics(&self) -> bool {
        matches!(
            self,
            Self::PlatformAdmin | Self::Admin | Self::Registrar | Self::Teacher
        )
    }

    /// Parses a role from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "platform_admin" => Some(Self::PlatformAdmin),
            "admin" => Some(Self::Admin),
            "accountant" => Some(Self::Accountant),
            "registrar" => Some(Self::Registrar),
            "teacher" => Some(Self::Teacher),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlatformAdmin => write!(f, "platform_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Accountant => write!(f, "accountant"),
            Self::Registrar => write!(f, "registrar"),
            Self::Teacher => write!(f, "teacher"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

/// Immutable caller context passed into every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantContext {
    /// The authenticated caller.
    pub caller_id: Uuid,
    /// The caller's tenant. `None` only for the platform role.
    pub tenant_id: Option<Uuid>,
    /// The caller's role.
    pub role: Role,
}

impl TenantContext {
    /// Creates a tenant-scoped context.
    #[must_use]
    pub const fn new(caller_id: Uuid, tenant_id: Uuid, role: Role) -> Self {
        Self {
            caller_id,
            tenant_id: Some(tenant_id),
            role,
        }
    }

    /// Creates a platform-level context with no tenant binding.
    #[must_use]
    pub const fn platform(caller_id: Uuid) -> Self {
        Self {
            caller_id,
            tenant_id: None,
            role: Role::PlatformAdmin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ranks_are_strict() {
        assert!(Role::PlatformAdmin.rank() > Role::Admin.rank());
        assert!(Role::Admin.rank() > Role::Accountant.rank());
        assert!(Role::Accountant.rank() > Role::Registrar.rank());
        assert!(Role::Registrar.rank() > Role::Teacher.rank());
        assert!(Role::Teacher.rank() > Role::Viewer.rank());
    }

    #[test]
    fn test_role_capabilities() {
        assert!(Role::Accountant.can_manage_finances());
        assert!(!Role::Registrar.can_manage_finances());
        assert!(Role::Registrar.can_manage_enrollments());
        assert!(!Role::Teacher.can_manage_enrollments());
        assert!(Role::Teacher.can_record_academics());
        assert!(!Role::Viewer.can_record_academics());
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [
            Role::PlatformAdmin,
            Role::Admin,
            Role::Accountant,
            Role::Registrar,
            Role::Teacher,
            Role::Viewer,
        ] {
            assert_eq!(Role::parse(&role.to_string()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn test_platform_context_has_no_tenant() {
        let ctx = TenantContext::platform(Uuid::new_v4());
        assert!(ctx.tenant_id.is_none());
        assert!(ctx.role.is_platform());
    }
}

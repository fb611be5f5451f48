//! Authentication claim types.
//!
//! Scolara performs no independent authentication; the identity provider is
//! external. These claims are the wire form of the resolved caller identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::context::{Role, TenantContext};

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller user ID).
    pub sub: Uuid,
    /// Tenant ID. Absent for platform-level callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Uuid>,
    /// The caller's role.
    pub role: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a caller.
    #[must_use]
    pub fn new(
        caller_id: Uuid,
        tenant_id: Option<Uuid>,
        role: Role,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: caller_id,
            tenant: tenant_id,
            role: role.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the caller ID from claims.
    #[must_use]
    pub const fn caller_id(&self) -> Uuid {
        self.sub
    }

    /// Resolves the claims into a caller context.
    ///
    /// Returns `None` when the role string is unknown or a non-platform role
    /// carries no tenant id.
    #[must_use]
    pub fn to_context(&self) -> Option<TenantContext> {
        let role = Role::parse(&self.role)?;
        if self.tenant.is_none() && !role.is_platform() {
            return None;
        }
        Some(TenantContext {
            caller_id: self.sub,
            tenant_id: self.tenant,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_to_context() {
        let tenant = Uuid::new_v4();
        let claims = Claims::new(
            Uuid::new_v4(),
            Some(tenant),
            Role::Accountant,
            Utc::now() + Duration::minutes(15),
        );
        let ctx = claims.to_context().unwrap();
        assert_eq!(ctx.tenant_id, Some(tenant));
        assert_eq!(ctx.role, Role::Accountant);
    }

    #[test]
    fn test_platform_claims_without_tenant() {
        let claims = Claims::new(
            Uuid::new_v4(),
            None,
            Role::PlatformAdmin,
            Utc::now() + Duration::minutes(15),
        );
        let ctx = claims.to_context().unwrap();
        assert!(ctx.tenant_id.is_none());
    }

    #[test]
    fn test_tenant_role_requires_tenant() {
        let claims = Claims::new(
            Uuid::new_v4(),
            None,
            Role::Teacher,
            Utc::now() + Duration::minutes(15),
        );
        assert!(claims.to_context().is_none());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let mut claims = Claims::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            Role::Viewer,
            Utc::now() + Duration::minutes(15),
        );
        claims.role = "superuser".to_string();
        assert!(claims.to_context().is_none());
    }
}

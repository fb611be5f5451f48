//! Property-based tests for the authorization gate.

use proptest::prelude::*;
use uuid::Uuid;

use super::{AuthzError, check_can_manage_role, check_role, check_tenant_access};
use scolara_shared::{Role, TenantContext};

/// Strategy for generating any role.
fn role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::PlatformAdmin),
        Just(Role::Admin),
        Just(Role::Accountant),
        Just(Role::Registrar),
        Just(Role::Teacher),
        Just(Role::Viewer),
    ]
}

/// Strategy for generating tenant-bound (non-platform) roles.
fn tenant_role_strategy() -> impl Strategy<Value = Role> {
    prop_oneof![
        Just(Role::Admin),
        Just(Role::Accountant),
        Just(Role::Registrar),
        Just(Role::Teacher),
        Just(Role::Viewer),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A tenant-bound caller can never access another tenant, whatever the role.
    #[test]
    fn prop_tenant_isolation_holds_for_all_roles(
        role in tenant_role_strategy(),
    ) {
        let ctx = TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), role);
        let result = check_tenant_access(&ctx, Some(Uuid::new_v4()));
        prop_assert_eq!(result, Err(AuthzError::TenantMismatch));
    }

    /// A caller always passes the tenant check against their own tenant.
    #[test]
    fn prop_own_tenant_always_accessible(
        role in tenant_role_strategy(),
    ) {
        let tenant = Uuid::new_v4();
        let ctx = TenantContext::new(Uuid::new_v4(), tenant, role);
        prop_assert!(check_tenant_access(&ctx, Some(tenant)).is_ok());
    }

    /// The platform role passes every tenant check.
    #[test]
    fn prop_platform_passes_all_tenant_checks(
        target in prop::option::of(Just(())),
    ) {
        let ctx = TenantContext::platform(Uuid::new_v4());
        let target = target.map(|()| Uuid::new_v4());
        prop_assert!(check_tenant_access(&ctx, target).is_ok());
    }

    /// `check_role` accepts exactly the allowed set, plus the platform role.
    #[test]
    fn prop_role_check_matches_allowed_set(
        caller in role_strategy(),
        allowed in prop::collection::vec(role_strategy(), 0..4),
    ) {
        let ctx = TenantContext::new(Uuid::new_v4(), Uuid::new_v4(), caller);
        let result = check_role(&ctx, &allowed);
        let expected_ok = caller.is_platform() || allowed.contains(&caller);
        prop_assert_eq!(result.is_ok(), expected_ok);
    }

    /// Role management is antisymmetric: if A can manage B's role then B
    /// cannot manage A's role.
    #[test]
    fn prop_role_management_antisymmetric(
        a in tenant_role_strategy(),
        b in tenant_role_strategy(),
    ) {
        let tenant = Uuid::new_v4();
        let ctx_a = TenantContext::new(Uuid::new_v4(), tenant, a);
        let ctx_b = TenantContext::new(Uuid::new_v4(), tenant, b);

        let a_manages_b = check_can_manage_role(&ctx_a, b, Some(tenant)).is_ok();
        let b_manages_a = check_can_manage_role(&ctx_b, a, Some(tenant)).is_ok();
        prop_assert!(!(a_manages_b && b_manages_a));
    }

    /// No tenant-bound role can ever manage a role at or above its own rank.
    #[test]
    fn prop_no_upward_role_management(
        caller in tenant_role_strategy(),
        target in role_strategy(),
    ) {
        let tenant = Uuid::new_v4();
        let ctx = TenantContext::new(Uuid::new_v4(), tenant, caller);
        let result = check_can_manage_role(&ctx, target, Some(tenant));
        if target.rank() >= caller.rank() {
            prop_assert!(result.is_err());
        } else {
            prop_assert!(result.is_ok());
        }
    }
}

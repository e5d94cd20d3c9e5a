//! API-side authorization guard for commands.
//!
//! Permissions are checked at the request boundary, before any service call;
//! the order aggregate separately checks that the caller is a party to the order.

use marketplace_auth::{AuthzError, CommandAuthorization, Permission, Principal, Role, authorize};

use crate::context::PrincipalContext;

pub const ORDERS_CREATE: &str = "orders.create";
pub const ORDERS_READ: &str = "orders.read";
pub const ORDERS_STATUS_UPDATE: &str = "orders.status.update";
pub const COMMISSION_READ: &str = "commission.read";
pub const COMMISSION_CALCULATE: &str = "commission.calculate";
pub const COMMISSION_MANAGE: &str = "commission.manage";
pub const PAYOUTS_READ: &str = "payouts.read";

/// Check authorization for a command in the current request context.
pub fn authorize_command<C: CommandAuthorization>(
    principal: &PrincipalContext,
    command: &C,
) -> Result<(), AuthzError> {
    let principal = Principal {
        user_id: principal.user_id(),
        roles: principal.roles().to_vec(),
        permissions: permissions_from_roles(principal.roles()),
    };

    for perm in command.required_permissions() {
        authorize(&principal, perm)?;
    }

    Ok(())
}

/// Static role → permission mapping.
fn permissions_from_roles(roles: &[Role]) -> Vec<Permission> {
    if roles.contains(&Role::ADMIN) {
        return vec![Permission::WILDCARD];
    }

    let mut perms: Vec<Permission> = Vec::new();
    let mut grant = |names: &[&'static str]| {
        for name in names {
            let perm = Permission::new(*name);
            if !perms.contains(&perm) {
                perms.push(perm);
            }
        }
    };

    if roles.contains(&Role::BUYER) {
        grant(&[ORDERS_CREATE, ORDERS_READ, ORDERS_STATUS_UPDATE]);
    }
    if roles.contains(&Role::SELLER) {
        grant(&[
            ORDERS_READ,
            ORDERS_STATUS_UPDATE,
            COMMISSION_READ,
            COMMISSION_CALCULATE,
            PAYOUTS_READ,
        ]);
    }

    perms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::routes::common::CmdAuth;
    use marketplace_core::UserId;

    fn check(roles: Vec<Role>, perm: &'static str) -> Result<(), AuthzError> {
        let ctx = PrincipalContext::new(UserId::new(), roles);
        let cmd = CmdAuth {
            inner: (),
            required: vec![Permission::new(perm)],
        };
        authorize_command(&ctx, &cmd)
    }

    #[test]
    fn admin_holds_every_permission() {
        assert_eq!(permissions_from_roles(&[Role::ADMIN]), vec![Permission::WILDCARD]);
        assert!(check(vec![Role::ADMIN], COMMISSION_MANAGE).is_ok());
    }

    #[test]
    fn buyer_cannot_see_commission_or_payouts() {
        assert!(check(vec![Role::BUYER], ORDERS_CREATE).is_ok());
        assert!(check(vec![Role::BUYER], COMMISSION_READ).is_err());
        assert!(check(vec![Role::BUYER], PAYOUTS_READ).is_err());
    }

    #[test]
    fn seller_cannot_place_orders_or_manage_tiers() {
        assert!(check(vec![Role::SELLER], PAYOUTS_READ).is_ok());
        assert!(check(vec![Role::SELLER], ORDERS_CREATE).is_err());
        assert!(check(vec![Role::SELLER], COMMISSION_MANAGE).is_err());
    }

    #[test]
    fn roles_combine_without_duplicates() {
        let perms = permissions_from_roles(&[Role::BUYER, Role::SELLER]);
        let reads = perms.iter().filter(|p| p.as_str() == ORDERS_READ).count();
        assert_eq!(reads, 1);
        assert!(perms.contains(&Permission::new(ORDERS_CREATE)));
        assert!(perms.contains(&Permission::new(PAYOUTS_READ)));
    }

    #[test]
    fn unknown_roles_grant_nothing() {
        assert!(permissions_from_roles(&[Role::new("viewer")]).is_empty());
    }
}

use core::str::FromStr;

use marketplace_auth::Role;
use marketplace_core::UserId;
use marketplace_orders::MarketRole;

/// Principal context for a request (authenticated identity + roles).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    user_id: UserId,
    roles: Vec<Role>,
}

impl PrincipalContext {
    pub fn new(user_id: UserId, roles: Vec<Role>) -> Self {
        Self { user_id, roles }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(&Role::ADMIN)
    }

    /// Market roles held by the caller; token roles outside the market are ignored.
    pub fn market_roles(&self) -> Vec<MarketRole> {
        self.roles
            .iter()
            .filter_map(|r| MarketRole::from_str(r.as_str()).ok())
            .collect()
    }
}

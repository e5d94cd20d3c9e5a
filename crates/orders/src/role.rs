use core::str::FromStr;

use serde::{Deserialize, Serialize};

use marketplace_core::DomainError;

use crate::status::StatusField;

/// The part an actor plays on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketRole {
    Buyer,
    Seller,
    Admin,
}

impl MarketRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MarketRole::Buyer => "buyer",
            MarketRole::Seller => "seller",
            MarketRole::Admin => "admin",
        }
    }

    /// Plural form used in rejection messages ("Buyers cannot update ...").
    pub fn plural(self) -> &'static str {
        match self {
            MarketRole::Buyer => "Buyers",
            MarketRole::Seller => "Sellers",
            MarketRole::Admin => "Admins",
        }
    }

    /// Status axes this role may set.
    ///
    /// Buyers can additionally set `shipping` together with a receipt
    /// confirmation; that exception is handled by the transition rules.
    pub fn permitted_fields(self) -> &'static [StatusField] {
        match self {
            MarketRole::Buyer => &[StatusField::BuyerAction],
            MarketRole::Seller => &[StatusField::Shipping],
            MarketRole::Admin => &[StatusField::Payment, StatusField::AdminAction],
        }
    }

    pub fn may_set(self, field: StatusField) -> bool {
        self.permitted_fields().contains(&field)
    }
}

impl core::fmt::Display for MarketRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(MarketRole::Buyer),
            "seller" => Ok(MarketRole::Seller),
            "admin" => Ok(MarketRole::Admin),
            other => Err(DomainError::validation(format!("unknown role '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelists_do_not_overlap() {
        for field in StatusField::ALL {
            let owners = [MarketRole::Buyer, MarketRole::Seller, MarketRole::Admin]
                .into_iter()
                .filter(|r| r.may_set(field))
                .count();
            assert_eq!(owners, 1, "{field} should belong to exactly one role");
        }
    }

    #[test]
    fn parses_lowercase_names_only() {
        assert_eq!("seller".parse::<MarketRole>().unwrap(), MarketRole::Seller);
        assert!("Seller".parse::<MarketRole>().is_err());
        assert!("moderator".parse::<MarketRole>().is_err());
    }
}

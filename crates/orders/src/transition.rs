//! Role-scoped status transition rules.
//!
//! [`validate_status_update`] is a per-role whitelist over status axes plus a
//! single precondition (sellers only ship pending orders). It does not walk a
//! full transition graph; callers enforce anything beyond that.

use thiserror::Error;

use crate::role::MarketRole;
use crate::status::{OrderStatus, ShippingStatus, StatusField, StatusUpdate};

/// Why a status update was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejected {
    #[error("Buyers cannot update shipping status directly")]
    BuyerShippingDirect,

    #[error("Can only mark pending orders as shipped")]
    ShippingNotPending,

    #[error("{} cannot update {}", .role.plural(), .field)]
    FieldNotPermitted { role: MarketRole, field: StatusField },
}

/// Check whether `role` may apply `updates` to an order currently in `current`.
///
/// Pure; never mutates anything. Axes are checked in [`StatusField::ALL`]
/// order and the first violation is reported.
pub fn validate_status_update(
    current: &OrderStatus,
    updates: &StatusUpdate,
    role: MarketRole,
) -> Result<(), TransitionRejected> {
    match role {
        MarketRole::Buyer => validate_buyer(updates),
        MarketRole::Seller => validate_seller(current, updates),
        MarketRole::Admin => validate_whitelist(MarketRole::Admin, updates),
    }
}

fn validate_buyer(updates: &StatusUpdate) -> Result<(), TransitionRejected> {
    for field in updates.fields() {
        match field {
            StatusField::BuyerAction => {}
            // Confirming receipt also finalizes shipping.
            StatusField::Shipping
                if updates.is_buyer_receipt()
                    && updates.shipping == Some(ShippingStatus::Received) => {}
            StatusField::Shipping => return Err(TransitionRejected::BuyerShippingDirect),
            field => {
                return Err(TransitionRejected::FieldNotPermitted {
                    role: MarketRole::Buyer,
                    field,
                });
            }
        }
    }
    Ok(())
}

fn validate_seller(
    current: &OrderStatus,
    updates: &StatusUpdate,
) -> Result<(), TransitionRejected> {
    validate_whitelist(MarketRole::Seller, updates)?;

    if updates.shipping.is_some() && current.shipping != ShippingStatus::Pending {
        return Err(TransitionRejected::ShippingNotPending);
    }
    Ok(())
}

fn validate_whitelist(role: MarketRole, updates: &StatusUpdate) -> Result<(), TransitionRejected> {
    match updates.fields().find(|f| !role.may_set(*f)) {
        Some(field) => Err(TransitionRejected::FieldNotPermitted { role, field }),
        None => Ok(()),
    }
}

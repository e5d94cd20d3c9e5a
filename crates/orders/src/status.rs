//! Order status axes.
//!
//! An order carries four independent status axes. Each one is a tiny state
//! machine of its own; the rules about who may move them live in
//! [`crate::transition`].

use serde::{Deserialize, Serialize};

/// Physical fulfillment state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingStatus {
    #[default]
    Pending,
    Shipped,
    Received,
}

/// The buyer's attestation about a shipped order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuyerAction {
    #[default]
    None,
    Received,
    Delayed,
    Damaged,
}

/// Whether funds have been released to the seller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
}

/// Outcome of an admin review.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminAction {
    #[default]
    None,
    Reviewed,
    Refunded,
    Other,
}

/// Full status of an order. All four axes are always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatus {
    pub shipping: ShippingStatus,
    pub buyer_action: BuyerAction,
    pub payment: PaymentStatus,
    pub admin_action: AdminAction,
}

impl OrderStatus {
    /// Funds can go to the seller once the buyer confirmed receipt.
    pub fn can_release_payment(&self) -> bool {
        self.shipping == ShippingStatus::Received
            && self.buyer_action == BuyerAction::Received
            && self.payment == PaymentStatus::Pending
    }

    pub fn can_mark_as_shipped(&self) -> bool {
        self.shipping == ShippingStatus::Pending
    }

    pub fn can_buyer_act(&self) -> bool {
        self.shipping == ShippingStatus::Shipped
    }

    pub fn has_order_issues(&self) -> bool {
        matches!(self.buyer_action, BuyerAction::Delayed | BuyerAction::Damaged)
    }
}

/// Names one status axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusField {
    Shipping,
    BuyerAction,
    Payment,
    AdminAction,
}

impl StatusField {
    /// Every axis, in the order updates are checked.
    pub const ALL: [StatusField; 4] = [
        StatusField::Shipping,
        StatusField::BuyerAction,
        StatusField::Payment,
        StatusField::AdminAction,
    ];

    /// Field name as it appears on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            StatusField::Shipping => "shipping",
            StatusField::BuyerAction => "buyerAction",
            StatusField::Payment => "payment",
            StatusField::AdminAction => "adminAction",
        }
    }
}

impl core::fmt::Display for StatusField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Partial status update. Unset axes are left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StatusUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping: Option<ShippingStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_action: Option<BuyerAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_action: Option<AdminAction>,
}

impl StatusUpdate {
    pub fn touches(&self, field: StatusField) -> bool {
        match field {
            StatusField::Shipping => self.shipping.is_some(),
            StatusField::BuyerAction => self.buyer_action.is_some(),
            StatusField::Payment => self.payment.is_some(),
            StatusField::AdminAction => self.admin_action.is_some(),
        }
    }

    /// Axes set by this update, in [`StatusField::ALL`] order.
    pub fn fields(&self) -> impl Iterator<Item = StatusField> + '_ {
        StatusField::ALL.into_iter().filter(|f| self.touches(*f))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// `true` when this is the buyer confirming receipt of the goods.
    pub fn is_buyer_receipt(&self) -> bool {
        self.buyer_action == Some(BuyerAction::Received)
    }

    /// Overlay this update on `current`.
    pub fn apply_to(&self, current: &OrderStatus) -> OrderStatus {
        OrderStatus {
            shipping: self.shipping.unwrap_or(current.shipping),
            buyer_action: self.buyer_action.unwrap_or(current.buyer_action),
            payment: self.payment.unwrap_or(current.payment),
            admin_action: self.admin_action.unwrap_or(current.admin_action),
        }
    }
}

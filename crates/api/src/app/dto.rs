use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use marketplace_commission::CommissionTier;
use marketplace_core::{AggregateRoot, OrderId, UserId};
use marketplace_orders::{MarketRole, Order, StatusUpdate};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub seller_id: String,
    pub amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub updates: StatusUpdate,
    /// Which of the caller's roles to act in; inferred from the order when absent.
    #[serde(default)]
    pub role: Option<MarketRole>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceTiersRequest {
    pub tiers: Vec<CommissionTier>,
    /// Version the caller last read; omitted means unconditional replace.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct CalculateCommissionRequest {
    pub amount: Decimal,
}

// -------------------------
// Response mapping
// -------------------------

pub fn order_to_json(order: &Order) -> Value {
    json!({
        "id": order.id_typed().to_string(),
        "buyerId": order.buyer_id().map(|id| id.to_string()),
        "sellerId": order.seller_id().map(|id| id.to_string()),
        "amount": order.amount(),
        "status": order.status(),
        "version": order.version(),
        "createdAt": order.placed_at(),
        "updatedAt": order.updated_at(),
    })
}

pub fn actions_to_json(order: &Order) -> Value {
    let status = order.status();
    json!({
        "canReleasePayment": status.can_release_payment(),
        "canMarkAsShipped": status.can_mark_as_shipped(),
        "canBuyerAct": status.can_buyer_act(),
        "hasOrderIssues": status.has_order_issues(),
    })
}

// -------------------------
// Path parsing
// -------------------------

pub fn parse_order_id(raw: &str) -> Result<OrderId, axum::response::Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid order id"))
}

pub fn parse_user_id(raw: &str, what: &'static str) -> Result<UserId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id"))
    })
}

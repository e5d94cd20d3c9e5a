use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::{get, patch, post},
};
use chrono::Utc;
use serde_json::json;

use marketplace_core::OrderId;
use marketplace_orders::{Actor, MarketRole, Order, PlaceOrder, UpdateStatus};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(place_order))
        .route("/:id", get(get_order))
        .route("/:id/actions", get(get_actions))
        .route("/:id/status", patch(update_status))
}

pub async fn place_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::PlaceOrderRequest>,
) -> axum::response::Response {
    let seller_id = match dto::parse_user_id(&body.seller_id, "seller") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if !principal.market_roles().contains(&MarketRole::Buyer) {
        return errors::json_error(StatusCode::FORBIDDEN, "forbidden", "only buyers can place orders");
    }

    let cmd = CmdAuth::new(
        PlaceOrder {
            order_id: OrderId::new(),
            buyer_id: principal.user_id(),
            seller_id,
            amount: body.amount,
            occurred_at: Utc::now(),
        },
        authz::ORDERS_CREATE,
    );
    let cmd = match cmd.authorize(&principal) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match services.orders.place_order(cmd) {
        Ok(order) => errors::json_ok(
            StatusCode::CREATED,
            json!({ "order": dto::order_to_json(&order) }),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order = match load_visible_order(&services, &principal, &id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    errors::json_ok(StatusCode::OK, json!({ "order": dto::order_to_json(&order) }))
}

pub async fn get_actions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order = match load_visible_order(&services, &principal, &id) {
        Ok(o) => o,
        Err(resp) => return resp,
    };
    errors::json_ok(
        StatusCode::OK,
        json!({
            "orderId": order.id_typed().to_string(),
            "actions": dto::actions_to_json(&order),
        }),
    )
}

pub async fn update_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateStatusRequest>,
) -> axum::response::Response {
    let order_id = match dto::parse_order_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let order = match services.orders.get_order(order_id) {
        Ok(o) => o,
        Err(e) => return errors::service_error_to_response(e),
    };
    let role = match acting_role(&principal, &order, body.role) {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let cmd = CmdAuth::new(
        UpdateStatus {
            order_id,
            actor: Actor {
                user_id: principal.user_id(),
                role,
            },
            updates: body.updates,
            occurred_at: Utc::now(),
        },
        authz::ORDERS_STATUS_UPDATE,
    );
    let cmd = match cmd.authorize(&principal) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    match services.orders.update_status(cmd) {
        Ok(order) => errors::json_ok(StatusCode::OK, json!({ "order": dto::order_to_json(&order) })),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Read access: the order's buyer, its seller, or an admin.
fn load_visible_order(
    services: &AppServices,
    principal: &PrincipalContext,
    id: &str,
) -> Result<Order, axum::response::Response> {
    let order_id = dto::parse_order_id(id)?;

    CmdAuth::new((), authz::ORDERS_READ).authorize(principal)?;

    let order = services
        .orders
        .get_order(order_id)
        .map_err(errors::service_error_to_response)?;

    if !order.involves(principal.user_id()) && !principal.is_admin() {
        return Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "not a party to this order",
        ));
    }
    Ok(order)
}

/// Pick the market role the caller acts in for `order`.
///
/// An explicit `requested` role must be held by the caller. Otherwise the
/// caller's side of the order decides (buyer, then seller), with admin as the
/// fallback for orders the caller is not party to.
fn acting_role(
    principal: &PrincipalContext,
    order: &Order,
    requested: Option<MarketRole>,
) -> Result<MarketRole, axum::response::Response> {
    let held = principal.market_roles();
    let user = Some(principal.user_id());

    if let Some(role) = requested {
        return if held.contains(&role) {
            Ok(role)
        } else {
            Err(errors::json_error(
                StatusCode::FORBIDDEN,
                "forbidden",
                format!("caller does not hold the {role} role"),
            ))
        };
    }

    let inferred = [
        (MarketRole::Buyer, order.buyer_id() == user),
        (MarketRole::Seller, order.seller_id() == user),
        (MarketRole::Admin, true),
    ]
    .into_iter()
    .find(|(role, matches)| *matches && held.contains(role))
    .map(|(role, _)| role);

    // Fall back to any held role; the aggregate then refuses non-parties.
    inferred.or_else(|| held.first().copied()).ok_or_else(|| {
        errors::json_error(StatusCode::FORBIDDEN, "forbidden", "caller holds no market role")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_auth::Role;
    use marketplace_core::{Aggregate, UserId};
    use marketplace_orders::OrderCommand;
    use rust_decimal::Decimal;

    fn order(buyer: UserId, seller: UserId) -> Order {
        let order_id = OrderId::new();
        let mut order = Order::empty(order_id);
        let events = order
            .handle(&OrderCommand::PlaceOrder(PlaceOrder {
                order_id,
                buyer_id: buyer,
                seller_id: seller,
                amount: Decimal::TEN,
                occurred_at: Utc::now(),
            }))
            .unwrap();
        for e in &events {
            order.apply(e);
        }
        order
    }

    #[test]
    fn role_is_inferred_from_the_callers_side() {
        let user = UserId::new();
        let ctx = PrincipalContext::new(user, vec![Role::BUYER, Role::SELLER]);

        let bought = order(user, UserId::new());
        assert_eq!(acting_role(&ctx, &bought, None).unwrap(), MarketRole::Buyer);

        let sold = order(UserId::new(), user);
        assert_eq!(acting_role(&ctx, &sold, None).unwrap(), MarketRole::Seller);
    }

    #[test]
    fn admin_acts_on_foreign_orders() {
        let ctx = PrincipalContext::new(UserId::new(), vec![Role::ADMIN]);
        let o = order(UserId::new(), UserId::new());
        assert_eq!(acting_role(&ctx, &o, None).unwrap(), MarketRole::Admin);
    }

    #[test]
    fn requested_role_must_be_held() {
        let user = UserId::new();
        let ctx = PrincipalContext::new(user, vec![Role::BUYER]);
        let o = order(user, UserId::new());

        assert_eq!(
            acting_role(&ctx, &o, Some(MarketRole::Buyer)).unwrap(),
            MarketRole::Buyer
        );
        let resp = acting_role(&ctx, &o, Some(MarketRole::Admin)).unwrap_err();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn caller_without_market_role_is_forbidden() {
        let ctx = PrincipalContext::new(UserId::new(), vec![Role::new("viewer")]);
        let o = order(UserId::new(), UserId::new());
        let resp = acting_role(&ctx, &o, None).unwrap_err();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}

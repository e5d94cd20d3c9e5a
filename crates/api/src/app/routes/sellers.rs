use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    http::StatusCode,
    routing::get,
};
use serde_json::json;

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new().route("/:id/payouts", get(get_payouts))
}

/// Balance and payout history; visible to the seller themself and to admins.
pub async fn get_payouts(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let seller_id = match dto::parse_user_id(&id, "seller") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    if let Err(resp) = CmdAuth::new((), authz::PAYOUTS_READ).authorize(&principal) {
        return resp;
    }
    if seller_id != principal.user_id() && !principal.is_admin() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "payouts are visible to the seller only",
        );
    }

    match services.orders.seller_account(seller_id) {
        Ok(account) => errors::json_ok(StatusCode::OK, json!({ "account": account })),
        Err(e) => errors::service_error_to_response(e),
    }
}

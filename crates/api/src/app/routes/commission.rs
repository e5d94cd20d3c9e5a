use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
};
use serde_json::json;

use marketplace_core::{ExpectedVersion, MAX_AMOUNT, is_valid_amount};

use crate::app::routes::common::CmdAuth;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/tiers", get(get_tiers).put(replace_tiers))
        .route("/calculate", post(calculate))
}

pub async fn get_tiers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = CmdAuth::new((), authz::COMMISSION_READ).authorize(&principal) {
        return resp;
    }

    match services.commission_config() {
        Ok(config) => errors::json_ok(StatusCode::OK, json!({ "config": config })),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn replace_tiers(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::ReplaceTiersRequest>,
) -> axum::response::Response {
    let body = match CmdAuth::new(body, authz::COMMISSION_MANAGE).authorize(&principal) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    let expected = body
        .expected_version
        .map_or(ExpectedVersion::Any, ExpectedVersion::Exact);

    match services.replace_commission_tiers(body.tiers, expected, principal.user_id()) {
        Ok(config) => errors::json_ok(StatusCode::OK, json!({ "config": config })),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn calculate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CalculateCommissionRequest>,
) -> axum::response::Response {
    let body = match CmdAuth::new(body, authz::COMMISSION_CALCULATE).authorize(&principal) {
        Ok(b) => b,
        Err(resp) => return resp,
    };

    if !is_valid_amount(body.amount) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("amount must be between 0 and {MAX_AMOUNT}"),
        );
    }

    match services.orders.quote_commission(body.amount) {
        Ok(calc) => errors::json_ok(StatusCode::OK, json!({ "calculation": calc })),
        Err(e) => errors::service_error_to_response(e),
    }
}

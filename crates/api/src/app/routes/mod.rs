use axum::{Router, routing::get};

pub mod commission;
pub mod common;
pub mod orders;
pub mod sellers;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/orders", orders::router())
        .nest("/commission", commission::router())
        .nest("/sellers", sellers::router())
}

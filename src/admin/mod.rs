//! Read-only admin endpoints on the router.

pub mod handlers;

use axum::routing::get;
use axum::Router;

use crate::http::server::AppState;
use self::handlers::*;

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/backends", get(get_backends))
}

//! Admin Order API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

/// 订单管理路由 (仅 ADMIN)
pub fn router(state: &ServerState) -> Router<ServerState> {
    let routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new().nest("/api/admin/pedidos", routes)
}

//! Admin Statistics API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

/// 统计报表路由 (仅 ADMIN)
pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .route("/api/admin/estadisticas", get(handler::get_statistics))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

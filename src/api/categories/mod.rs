//! Category API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router(state: &ServerState) -> Router<ServerState> {
    // 店面只读路由 (公共)
    let read_routes = Router::new().route("/", get(handler::list));

    // 目录维护路由 (仅 ADMIN)
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new().nest("/api/categorias", read_routes.merge(manage_routes))
}

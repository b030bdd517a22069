//! Checkout API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// 结算路由 - 公共 (结算前无须登录)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/pagos/crear-sesion", post(handler::create_session))
}

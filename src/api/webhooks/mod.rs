//! Webhook API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

/// 支付网关回调路由 - 签名验证是唯一的认证边界
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/webhooks/stripe", post(handler::stripe_webhook))
}

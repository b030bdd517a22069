//! Webhook API Handlers

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use serde::Serialize;

use crate::core::ServerState;
use crate::payments::webhook::{StripeEvent, WebhookProcessor};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/webhooks/stripe - 支付结果回调
///
/// 原始请求体参与签名计算，必须在任何解析之前校验。
/// 校验失败一律 400；业务侧的"订单不存在"等情况仍返回 200，
/// 避免网关无限重试。
pub async fn stripe_webhook(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::validation("Invalid signature"))?;

    state
        .signature_verifier()
        .verify(&body, signature)
        .map_err(|e| {
            tracing::warn!(target: "security", error = %e, "webhook signature verification failed");
            AppError::validation("Invalid signature")
        })?;

    let event = StripeEvent::parse(&body)?;
    tracing::debug!(kind = %event.kind, "webhook event received");

    let processor = WebhookProcessor::new(state.pool.clone(), state.mailer.clone());
    processor.process(event).await?;

    Ok(Json(WebhookAck { received: true }))
}

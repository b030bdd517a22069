//! Payment Webhook
//!
//! The webhook endpoint is otherwise unauthenticated, so the HMAC signature
//! check is its sole authentication boundary and fails closed. Deliveries are
//! at-least-once: every state change here must tolerate replays.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

use crate::db::models::OrderItem;
use crate::db::repository::OrderRepository;
use crate::db::repository::product::{decrement_product_stock, decrement_variant_stock};
use crate::services::mailer::Mailer;
use crate::services::notifications;
use crate::utils::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload before it is rejected as a replay
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("malformed signature header")]
    Malformed,

    #[error("signature timestamp outside tolerance")]
    Expired,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verifier for `stripe-signature` style headers: `t=<unix>,v1=<hex hmac>`
/// where the MAC covers `"<t>.<raw body>"`.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, payload: &[u8], header: &str) -> Result<(), SignatureError> {
        self.verify_at(payload, header, Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        payload: &[u8],
        header: &str,
        now: i64,
    ) -> Result<(), SignatureError> {
        let mut timestamp: Option<i64> = None;
        let mut candidates: Vec<&str> = Vec::new();

        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse().ok(),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureError::Malformed)?;
        if candidates.is_empty() {
            return Err(SignatureError::Malformed);
        }
        if (now - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(SignatureError::Expired);
        }

        let ts_prefix = timestamp.to_string();
        for candidate in candidates {
            let Ok(expected) = hex::decode(candidate) else {
                continue;
            };
            let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
                .map_err(|_| SignatureError::Malformed)?;
            mac.update(ts_prefix.as_bytes());
            mac.update(b".");
            mac.update(payload);
            // verify_slice is constant-time
            if mac.verify_slice(&expected).is_ok() {
                return Ok(());
            }
        }

        Err(SignatureError::Mismatch)
    }
}

/// Parsed gateway event
#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

impl StripeEvent {
    pub fn parse(payload: &[u8]) -> AppResult<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| AppError::validation(format!("Evento de webhook inválido: {e}")))
    }
}

fn metadata_pedido_id(object: &serde_json::Value) -> Option<&str> {
    object
        .get("metadata")
        .and_then(|m| m.get("pedido_id"))
        .and_then(serde_json::Value::as_str)
}

/// Applies verified gateway events to the order and catalog state.
pub struct WebhookProcessor {
    pool: SqlitePool,
    mailer: Arc<dyn Mailer>,
}

impl WebhookProcessor {
    pub fn new(pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        Self { pool, mailer }
    }

    /// Dispatch on event kind. Unknown kinds and unknown orders are
    /// acknowledged so the gateway stops retrying.
    pub async fn process(&self, event: StripeEvent) -> AppResult<()> {
        match event.kind.as_str() {
            "checkout.session.completed" => self.session_completed(&event.data.object).await,
            "checkout.session.expired" => self.session_expired(&event.data.object).await,
            "payment_intent.succeeded" => {
                let id = event.data.object.get("id").and_then(serde_json::Value::as_str);
                tracing::debug!(payment_intent = ?id, "payment intent succeeded");
                Ok(())
            }
            "payment_intent.payment_failed" => self.payment_failed(&event.data.object).await,
            other => {
                tracing::debug!(kind = %other, "ignoring unhandled webhook event");
                Ok(())
            }
        }
    }

    /// PENDIENTE→PAGADO plus the per-item stock decrements, one transaction.
    /// The conditional claim makes redelivery a no-op.
    async fn session_completed(&self, object: &serde_json::Value) -> AppResult<()> {
        let Some(pedido_id) = metadata_pedido_id(object) else {
            tracing::warn!("checkout.session.completed without pedido_id metadata");
            return Ok(());
        };
        let payment_intent = object
            .get("payment_intent")
            .and_then(serde_json::Value::as_str);

        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let claimed =
            OrderRepository::claim_pending_payment(&mut tx, pedido_id, payment_intent).await?;
        if !claimed {
            let estado: Option<String> =
                sqlx::query_scalar("SELECT estado_pago FROM pedidos WHERE id = ?")
                    .bind(pedido_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(AppError::from)?;
            match estado {
                None => tracing::warn!(pedido_id = %pedido_id, "order not found, acknowledging"),
                Some(estado) => tracing::info!(
                    pedido_id = %pedido_id,
                    estado_pago = %estado,
                    "duplicate delivery, stock decrement skipped"
                ),
            }
            tx.commit().await.map_err(AppError::from)?;
            return Ok(());
        }

        let items: Vec<OrderItem> =
            sqlx::query_as("SELECT * FROM pedido_items WHERE pedido_id = ?")
                .bind(pedido_id)
                .fetch_all(&mut *tx)
                .await
                .map_err(AppError::from)?;

        for item in &items {
            if let Some(variante_id) = &item.variante_id
                && !decrement_variant_stock(&mut tx, variante_id, item.cantidad).await?
            {
                tracing::warn!(
                    pedido_id = %pedido_id,
                    variante_id = %variante_id,
                    cantidad = item.cantidad,
                    "variant stock would go negative, decrement skipped"
                );
            }
            if !decrement_product_stock(&mut tx, &item.producto_id, item.cantidad).await? {
                tracing::warn!(
                    pedido_id = %pedido_id,
                    producto_id = %item.producto_id,
                    cantidad = item.cantidad,
                    "product stock would go negative, decrement skipped"
                );
            }
        }

        tx.commit().await.map_err(AppError::from)?;

        tracing::info!(pedido_id = %pedido_id, "Pedido completado y stock actualizado");

        // Confirmation email is best-effort and outside the transaction
        let orders = OrderRepository::new(self.pool.clone());
        if let Ok(Some(order)) = orders.find_by_id(pedido_id).await {
            notifications::send_order_confirmation(self.mailer.as_ref(), &order, &items).await;
        }

        Ok(())
    }

    async fn session_expired(&self, object: &serde_json::Value) -> AppResult<()> {
        let Some(pedido_id) = metadata_pedido_id(object) else {
            tracing::warn!("checkout.session.expired without pedido_id metadata");
            return Ok(());
        };

        let orders = OrderRepository::new(self.pool.clone());
        if orders.mark_payment_failed(pedido_id).await? {
            tracing::info!(pedido_id = %pedido_id, "checkout session expired, payment marked failed");
        } else {
            tracing::info!(pedido_id = %pedido_id, "session expiry ignored, payment already settled");
        }
        Ok(())
    }

    async fn payment_failed(&self, object: &serde_json::Value) -> AppResult<()> {
        let Some(payment_intent) = object.get("id").and_then(serde_json::Value::as_str) else {
            tracing::warn!("payment_intent.payment_failed without id");
            return Ok(());
        };

        let orders = OrderRepository::new(self.pool.clone());
        match orders.find_id_by_payment_id(payment_intent).await? {
            Some(pedido_id) => {
                if orders.mark_payment_failed(&pedido_id).await? {
                    tracing::info!(pedido_id = %pedido_id, "payment failed, order marked FALLIDO");
                }
            }
            None => {
                tracing::warn!(payment_intent = %payment_intent, "no order for failed payment, acknowledging");
            }
        }
        Ok(())
    }
}

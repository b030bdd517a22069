//! Delivery metrics hook

use crate::db::models::Order;

/// Record a delivered order. Best-effort: the structured event under the
/// `metrics` target is what downstream log pipelines aggregate on.
pub fn record_delivered_order(order: &Order) {
    tracing::info!(
        target: "metrics",
        event = "pedido_entregado",
        numero_pedido = %order.numero_pedido,
        total = order.total,
        "order delivered"
    );
}

//! Order Models
//!
//! A `pedido` carries two independent status axes: fulfillment
//! (`estado_pedido`) and payment (`estado_pago`). Items are snapshots taken
//! at order-creation time and never re-read from the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::fmt;
use std::str::FromStr;

/// Fulfillment status axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum OrderStatus {
    #[serde(rename = "PENDIENTE")]
    #[sqlx(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "PROCESANDO")]
    #[sqlx(rename = "PROCESANDO")]
    Processing,
    #[serde(rename = "ENVIADO")]
    #[sqlx(rename = "ENVIADO")]
    Shipped,
    #[serde(rename = "ENTREGADO")]
    #[sqlx(rename = "ENTREGADO")]
    Delivered,
    #[serde(rename = "CANCELADO")]
    #[sqlx(rename = "CANCELADO")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDIENTE",
            OrderStatus::Processing => "PROCESANDO",
            OrderStatus::Shipped => "ENVIADO",
            OrderStatus::Delivered => "ENTREGADO",
            OrderStatus::Cancelled => "CANCELADO",
        }
    }

    fn rank(self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Processing => 1,
            OrderStatus::Shipped => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    /// Fulfillment moves forward only (skipping states is allowed);
    /// cancellation is only possible before shipment.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        if self == next {
            return true;
        }
        match (self, next) {
            (OrderStatus::Pending | OrderStatus::Processing, OrderStatus::Cancelled) => true,
            (_, OrderStatus::Cancelled) => false,
            (OrderStatus::Cancelled, _) => false,
            (from, to) => to.rank() > from.rank(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDIENTE" => Ok(OrderStatus::Pending),
            "PROCESANDO" => Ok(OrderStatus::Processing),
            "ENVIADO" => Ok(OrderStatus::Shipped),
            "ENTREGADO" => Ok(OrderStatus::Delivered),
            "CANCELADO" => Ok(OrderStatus::Cancelled),
            other => Err(format!("estado de pedido inválido: {other}")),
        }
    }
}

/// Payment status axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PaymentStatus {
    #[serde(rename = "PENDIENTE")]
    #[sqlx(rename = "PENDIENTE")]
    Pending,
    #[serde(rename = "PAGADO")]
    #[sqlx(rename = "PAGADO")]
    Paid,
    #[serde(rename = "FALLIDO")]
    #[sqlx(rename = "FALLIDO")]
    Failed,
    #[serde(rename = "REEMBOLSADO")]
    #[sqlx(rename = "REEMBOLSADO")]
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDIENTE",
            PaymentStatus::Paid => "PAGADO",
            PaymentStatus::Failed => "FALLIDO",
            PaymentStatus::Refunded => "REEMBOLSADO",
        }
    }

    /// Payment settles exactly once; refunds only follow a settled payment.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid | PaymentStatus::Failed)
                | (PaymentStatus::Paid, PaymentStatus::Refunded)
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDIENTE" => Ok(PaymentStatus::Pending),
            "PAGADO" => Ok(PaymentStatus::Paid),
            "FALLIDO" => Ok(PaymentStatus::Failed),
            "REEMBOLSADO" => Ok(PaymentStatus::Refunded),
            other => Err(format!("estado de pago inválido: {other}")),
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub numero_pedido: String,
    pub cliente_email: String,
    pub cliente_nombre: String,
    pub cliente_telefono: Option<String>,
    pub direccion_envio: Json<serde_json::Value>,
    pub subtotal: i64,
    pub envio: i64,
    pub total: i64,
    pub metodo_pago: String,
    pub estado_pedido: OrderStatus,
    pub estado_pago: PaymentStatus,
    pub stripe_session_id: Option<String>,
    pub stripe_payment_id: Option<String>,
    pub tracking_number: Option<String>,
    pub notas: Option<String>,
    pub fecha_envio: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order item snapshot
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub pedido_id: String,
    pub producto_id: String,
    pub variante_id: Option<String>,
    pub nombre: String,
    pub precio: i64,
    pub cantidad: i64,
    pub subtotal: i64,
    pub talla: Option<String>,
    pub color: Option<String>,
}

/// New item snapshot, priced from the catalog at checkout time
#[derive(Debug, Clone)]
pub struct OrderItemDraft {
    pub producto_id: String,
    pub variante_id: Option<String>,
    pub nombre: String,
    pub precio: i64,
    pub cantidad: i64,
    pub talla: Option<String>,
    pub color: Option<String>,
}

impl OrderItemDraft {
    pub fn subtotal(&self) -> i64 {
        self.precio * self.cantidad
    }
}

/// Order with its items, for detail views
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub pedido: Order,
    pub items: Vec<OrderItem>,
}

/// Admin order mutation payload. Status fields arrive as raw strings so that
/// unknown values surface as a 400 instead of a serde rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub estado_pedido: Option<String>,
    pub estado_pago: Option<String>,
    pub tracking_number: Option<String>,
    pub notas: Option<String>,
    pub fecha_envio: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_forward_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_order_status_rejects_backward_transitions() {
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_order_status_cancellation_only_before_shipment() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Processing));
    }

    #[test]
    fn test_payment_status_settles_once() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Failed));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Pending));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn test_payment_status_refund_requires_paid() {
        assert!(PaymentStatus::Paid.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Pending.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Failed.can_transition_to(PaymentStatus::Refunded));
    }

    #[test]
    fn test_status_spanish_wire_values() {
        assert_eq!(
            serde_json::to_value(OrderStatus::Shipped).unwrap(),
            serde_json::json!("ENVIADO")
        );
        assert_eq!(
            serde_json::to_value(PaymentStatus::Paid).unwrap(),
            serde_json::json!("PAGADO")
        );
        assert_eq!("PENDIENTE".parse::<PaymentStatus>().unwrap(), PaymentStatus::Pending);
        assert!("ENVIADOO".parse::<OrderStatus>().is_err());
    }
}

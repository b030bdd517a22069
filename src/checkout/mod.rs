//! Checkout Session Initiator
//!
//! Turns a client cart into a PENDIENTE order plus a hosted payment session.
//! Nothing client-supplied is trusted for money or availability: prices and
//! stock are re-read from the catalog per line, and the totals are computed
//! here.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;
use validator::Validate;

use crate::db::models::OrderItemDraft;
use crate::db::repository::order::OrderDraft;
use crate::db::repository::{OrderRepository, ProductRepository};
use crate::payments::gateway::{PaymentGateway, SessionLineItem, SessionRequest};
use crate::utils::pricing::shipping_cost;
use crate::utils::{AppError, AppResult};

/// One cart line as submitted by the client. Any price field the client
/// attaches is ignored by deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    pub id: String,
    pub cantidad: i64,
    pub talla: Option<String>,
    pub color: Option<String>,
}

/// Customer contact info
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerInfo {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub phone: Option<String>,
}

/// Checkout payload: `{items[], customer{...}, shippingAddress{...}}`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutItem>,
    #[validate(nested)]
    pub customer: CustomerInfo,
    pub shipping_address: serde_json::Value,
}

/// Successful checkout response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub pedido_id: String,
    pub url: String,
}

/// Shipping and redirect configuration for checkout
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub costo_envio: i64,
    pub envio_gratis_desde: i64,
    pub public_url: String,
}

pub struct CheckoutService {
    products: ProductRepository,
    orders: OrderRepository,
    gateway: Arc<dyn PaymentGateway>,
    config: CheckoutConfig,
}

impl CheckoutService {
    pub fn new(pool: SqlitePool, gateway: Arc<dyn PaymentGateway>, config: CheckoutConfig) -> Self {
        Self {
            products: ProductRepository::new(pool.clone()),
            orders: OrderRepository::new(pool),
            gateway,
            config,
        }
    }

    /// Validate the cart against the catalog, create the PENDIENTE order and
    /// request a hosted payment session.
    ///
    /// A gateway failure leaves the order PENDIENTE without a session
    /// reference, for later reconciliation or manual cleanup.
    pub async fn create_session(&self, request: CheckoutRequest) -> AppResult<CheckoutResponse> {
        request.validate()?;

        if request.items.is_empty() {
            return Err(AppError::validation("El carrito está vacío"));
        }

        let mut drafts: Vec<OrderItemDraft> = Vec::with_capacity(request.items.len());

        for item in &request.items {
            if item.cantidad <= 0 {
                return Err(AppError::validation(format!(
                    "Cantidad inválida para el producto {}",
                    item.id
                )));
            }

            let producto = self
                .products
                .find_by_id(&item.id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Producto {} no encontrado", item.id)))?;

            if producto.stock < item.cantidad {
                return Err(AppError::conflict(format!(
                    "Stock insuficiente para {}. Disponible: {}",
                    producto.nombre, producto.stock
                )));
            }

            // Authoritative price; a matching variant overrides it
            let mut precio = producto.precio;
            let mut variante_id = None;

            if item.talla.is_some() || item.color.is_some() {
                let variantes = self.products.variants_for(&producto.id).await?;
                let matched = variantes.iter().find(|v| {
                    Some(v.talla.as_str()) == item.talla.as_deref()
                        && Some(v.color.as_str()) == item.color.as_deref()
                });

                if let Some(variante) = matched {
                    if variante.stock < item.cantidad {
                        return Err(AppError::conflict(format!(
                            "Stock insuficiente para la variante seleccionada de {}",
                            producto.nombre
                        )));
                    }
                    precio = variante.precio.unwrap_or(producto.precio);
                    variante_id = Some(variante.id.clone());
                }
            }

            drafts.push(OrderItemDraft {
                producto_id: producto.id,
                variante_id,
                nombre: producto.nombre,
                precio,
                cantidad: item.cantidad,
                talla: item.talla.clone(),
                color: item.color.clone(),
            });
        }

        let subtotal: i64 = drafts.iter().map(OrderItemDraft::subtotal).sum();
        let envio = shipping_cost(
            subtotal,
            self.config.costo_envio,
            self.config.envio_gratis_desde,
        );
        let total = subtotal + envio;

        let order = self
            .orders
            .create_with_items(
                OrderDraft {
                    cliente_email: request.customer.email.clone(),
                    cliente_nombre: request.customer.name.clone(),
                    cliente_telefono: request.customer.phone.clone(),
                    direccion_envio: request.shipping_address.clone(),
                    subtotal,
                    envio,
                    total,
                },
                &drafts,
            )
            .await?;

        let session_request = SessionRequest {
            pedido_id: order.id.clone(),
            cliente_email: request.customer.email.clone(),
            line_items: drafts
                .iter()
                .map(|draft| SessionLineItem {
                    nombre: draft.nombre.clone(),
                    // Gateway amounts are in centavos
                    unit_amount: draft.precio * 100,
                    cantidad: draft.cantidad,
                })
                .collect(),
            envio_amount: envio * 100,
            success_url: format!(
                "{}/pago-exitoso?session_id={{CHECKOUT_SESSION_ID}}&pedido_id={}",
                self.config.public_url, order.id
            ),
            cancel_url: format!("{}/carrito", self.config.public_url),
        };

        let session = self
            .gateway
            .create_checkout_session(&session_request)
            .await
            .map_err(|e| {
                tracing::error!(
                    pedido_id = %order.id,
                    error = %e,
                    "payment session creation failed, order left PENDIENTE"
                );
                AppError::upstream("Error al crear sesión de pago")
            })?;

        self.orders.set_session_id(&order.id, &session.id).await?;

        tracing::info!(
            pedido_id = %order.id,
            session_id = %session.id,
            total = total,
            "checkout session created"
        );

        Ok(CheckoutResponse {
            session_id: session.id,
            pedido_id: order.id,
            url: session.url,
        })
    }
}

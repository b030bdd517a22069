//! Admin Order API Handlers
//!
//! The order mutator enforces the lifecycle graph: fulfillment advances
//! forward only, cancellation is only possible before shipment, refunds only
//! follow a settled payment. Side effects (shipping email, delivery metric)
//! are best-effort and never roll back the status change.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{OrderDetail, OrderStatus, OrderUpdate, PaymentStatus};
use crate::db::repository::OrderRepository;
use crate::db::repository::order::{OrderAggregates, OrderFilter};
use crate::services::{metrics, notifications};
use crate::utils::{AppError, AppResult};

/// Admin order listing query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery {
    /// Fulfillment status filter
    pub estado: Option<String>,
    /// Inclusive range over created_at; `YYYY-MM-DD` or RFC 3339
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    /// Free text over numeroPedido / clienteNombre / clienteEmail
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn parse_fecha(value: &str, end_of_day: bool) -> AppResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Fecha inválida: {value}")))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    Ok(DateTime::from_naive_utc_and_offset(
        time.unwrap_or(date.and_hms_opt(0, 0, 0).unwrap_or_default()),
        Utc,
    ))
}

impl OrderQuery {
    fn into_filter(self) -> AppResult<OrderFilter> {
        let estado = match self.estado.as_deref() {
            Some(value) => Some(value.parse::<OrderStatus>().map_err(AppError::validation)?),
            None => None,
        };
        let fecha_inicio = match self.fecha_inicio.as_deref() {
            Some(value) => Some(parse_fecha(value, false)?),
            None => None,
        };
        let fecha_fin = match self.fecha_fin.as_deref() {
            Some(value) => Some(parse_fecha(value, true)?),
            None => None,
        };

        Ok(OrderFilter {
            estado,
            fecha_inicio,
            fecha_fin,
            search: self.search,
            page: self.page,
            limit: self.limit,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub pedidos: Vec<OrderDetail>,
    pub pagination: Pagination,
    pub stats: OrderAggregates,
}

/// GET /api/admin/pedidos - 订单列表 (过滤 + 分页 + 汇总)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<OrderQuery>,
) -> AppResult<Json<OrderListResponse>> {
    let filter = query.into_filter()?;
    let repo = OrderRepository::new(state.pool.clone());
    let page = repo.find_page(&filter).await?;

    let pages = if page.total > 0 {
        (page.total + page.limit - 1) / page.limit
    } else {
        1
    };

    Ok(Json(OrderListResponse {
        pedidos: page.items,
        pagination: Pagination {
            total: page.total,
            page: page.page,
            limit: page.limit,
            pages,
        },
        stats: page.stats,
    }))
}

/// GET /api/admin/pedidos/:id - 订单详情 (含条目)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool.clone());
    let detail = repo
        .find_detail(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Pedido no encontrado".to_string()))?;
    Ok(Json(detail))
}

/// PUT /api/admin/pedidos/:id - 更新订单状态/跟踪信息
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<OrderDetail>> {
    let repo = OrderRepository::new(state.pool.clone());
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Pedido no encontrado".to_string()))?;

    // Status strings are parsed here so an unknown value is a 400, not a
    // serde rejection
    let estado_pedido = match payload.estado_pedido.as_deref() {
        Some(value) => Some(value.parse::<OrderStatus>().map_err(AppError::validation)?),
        None => None,
    };
    let estado_pago = match payload.estado_pago.as_deref() {
        Some(value) => Some(value.parse::<PaymentStatus>().map_err(AppError::validation)?),
        None => None,
    };

    if let Some(next) = estado_pedido
        && !existing.estado_pedido.can_transition_to(next)
    {
        return Err(AppError::conflict(format!(
            "Transición de estado inválida: {} → {}",
            existing.estado_pedido, next
        )));
    }
    if let Some(next) = estado_pago
        && !existing.estado_pago.can_transition_to(next)
    {
        return Err(AppError::conflict(format!(
            "Transición de pago inválida: {} → {}",
            existing.estado_pago, next
        )));
    }

    let order = repo
        .update_admin(
            &id,
            estado_pedido,
            estado_pago,
            payload.tracking_number,
            payload.notas,
            payload.fecha_envio,
        )
        .await?;

    let shipped_now = estado_pedido == Some(OrderStatus::Shipped)
        && existing.estado_pedido != OrderStatus::Shipped;
    let delivered_now = estado_pedido == Some(OrderStatus::Delivered)
        && existing.estado_pedido != OrderStatus::Delivered;

    if shipped_now {
        notifications::send_shipping_notification(state.mailer.as_ref(), &order).await;
    }
    if delivered_now {
        metrics::record_delivered_order(&order);
    }

    let items = repo.items_for(&id).await?;
    Ok(Json(OrderDetail {
        pedido: order,
        items,
    }))
}

//! Order Repository

use super::{BaseRepository, RepoError, RepoResult, page_bounds};
use crate::db::models::{Order, OrderDetail, OrderItem, OrderItemDraft, OrderStatus, PaymentStatus};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sqlx::sqlite::SqliteConnection;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

/// Human-readable order number: `PED-<millis>-<alnum9>`
pub fn generate_numero_pedido() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(char::from)
        .collect::<String>()
        .to_lowercase();
    format!("PED-{}-{}", Utc::now().timestamp_millis(), suffix)
}

/// Admin order listing filter
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub estado: Option<OrderStatus>,
    pub fecha_inicio: Option<DateTime<Utc>>,
    pub fecha_fin: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Aggregates over the filtered order set
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderAggregates {
    pub cantidad: i64,
    pub suma_total: i64,
    pub promedio_total: f64,
}

/// One page of admin order results
#[derive(Debug)]
pub struct OrderPage {
    pub items: Vec<OrderDetail>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub stats: OrderAggregates,
}

/// Customer fields captured at checkout
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub cliente_email: String,
    pub cliente_nombre: String,
    pub cliente_telefono: Option<String>,
    pub direccion_envio: serde_json::Value,
    pub subtotal: i64,
    pub envio: i64,
    pub total: i64,
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// Create an order with its item snapshots in one transaction.
    /// Both status axes start at PENDIENTE.
    pub async fn create_with_items(
        &self,
        draft: OrderDraft,
        items: &[OrderItemDraft],
    ) -> RepoResult<Order> {
        if items.is_empty() {
            return Err(RepoError::Validation(
                "El carrito está vacío".to_string(),
            ));
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let numero_pedido = generate_numero_pedido();

        let mut tx = self.base.pool().begin().await?;

        sqlx::query(
            "INSERT INTO pedidos (id, numero_pedido, cliente_email, cliente_nombre, \
             cliente_telefono, direccion_envio, subtotal, envio, total, metodo_pago, \
             estado_pedido, estado_pago, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 'TARJETA', 'PENDIENTE', 'PENDIENTE', ?, ?)",
        )
        .bind(&id)
        .bind(&numero_pedido)
        .bind(&draft.cliente_email)
        .bind(&draft.cliente_nombre)
        .bind(&draft.cliente_telefono)
        .bind(Json(&draft.direccion_envio))
        .bind(draft.subtotal)
        .bind(draft.envio)
        .bind(draft.total)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO pedido_items (id, pedido_id, producto_id, variante_id, nombre, \
                 precio, cantidad, subtotal, talla, color) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(&item.producto_id)
            .bind(&item.variante_id)
            .bind(&item.nombre)
            .bind(item.precio)
            .bind(item.cantidad)
            .bind(item.subtotal())
            .bind(&item.talla)
            .bind(&item.color)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM pedidos WHERE id = ?")
            .bind(id)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(order)
    }

    pub async fn find_id_by_payment_id(&self, payment_id: &str) -> RepoResult<Option<String>> {
        let id: Option<String> =
            sqlx::query_scalar("SELECT id FROM pedidos WHERE stripe_payment_id = ?")
                .bind(payment_id)
                .fetch_optional(self.base.pool())
                .await?;
        Ok(id)
    }

    pub async fn items_for(&self, pedido_id: &str) -> RepoResult<Vec<OrderItem>> {
        let items =
            sqlx::query_as::<_, OrderItem>("SELECT * FROM pedido_items WHERE pedido_id = ?")
                .bind(pedido_id)
                .fetch_all(self.base.pool())
                .await?;
        Ok(items)
    }

    pub async fn find_detail(&self, id: &str) -> RepoResult<Option<OrderDetail>> {
        let Some(pedido) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.items_for(id).await?;
        Ok(Some(OrderDetail { pedido, items }))
    }

    /// Persist the gateway session reference after session creation.
    pub async fn set_session_id(&self, id: &str, session_id: &str) -> RepoResult<()> {
        sqlx::query("UPDATE pedidos SET stripe_session_id = ?, updated_at = ? WHERE id = ?")
            .bind(session_id)
            .bind(Utc::now())
            .bind(id)
            .execute(self.base.pool())
            .await?;
        Ok(())
    }

    /// Claim the PENDIENTE→PAGADO edge. Returns false when the order was
    /// already settled, which is how duplicate webhook deliveries are
    /// absorbed.
    pub async fn claim_pending_payment(
        conn: &mut SqliteConnection,
        pedido_id: &str,
        payment_id: Option<&str>,
    ) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE pedidos SET estado_pago = 'PAGADO', stripe_payment_id = ?, updated_at = ? \
             WHERE id = ? AND estado_pago = 'PENDIENTE'",
        )
        .bind(payment_id)
        .bind(Utc::now())
        .bind(pedido_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// PENDIENTE→FALLIDO, guarded so a late failure never clobbers a settled
    /// payment. Returns whether the edge applied.
    pub async fn mark_payment_failed(&self, pedido_id: &str) -> RepoResult<bool> {
        let result = sqlx::query(
            "UPDATE pedidos SET estado_pago = 'FALLIDO', updated_at = ? \
             WHERE id = ? AND estado_pago = 'PENDIENTE'",
        )
        .bind(Utc::now())
        .bind(pedido_id)
        .execute(self.base.pool())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Admin mutation: statuses are validated by the caller against the
    /// lifecycle graph before reaching here.
    pub async fn update_admin(
        &self,
        id: &str,
        estado_pedido: Option<OrderStatus>,
        estado_pago: Option<PaymentStatus>,
        tracking_number: Option<String>,
        notas: Option<String>,
        fecha_envio: Option<DateTime<Utc>>,
    ) -> RepoResult<Order> {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE pedidos SET updated_at = ");
        qb.push_bind(Utc::now());
        if let Some(estado) = estado_pedido {
            qb.push(", estado_pedido = ");
            qb.push_bind(estado);
        }
        if let Some(estado) = estado_pago {
            qb.push(", estado_pago = ");
            qb.push_bind(estado);
        }
        if let Some(tracking) = tracking_number {
            qb.push(", tracking_number = ");
            qb.push_bind(tracking);
        }
        if let Some(notas) = notas {
            qb.push(", notas = ");
            qb.push_bind(notas);
        }
        if let Some(fecha) = fecha_envio {
            qb.push(", fecha_envio = ");
            qb.push_bind(fecha);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);

        let result = qb.build().execute(self.base.pool()).await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound("Pedido no encontrado".to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Pedido no encontrado".to_string()))
    }

    /// Filtered, paginated admin listing with aggregate figures for the
    /// filtered set. Newest first.
    pub async fn find_page(&self, filter: &OrderFilter) -> RepoResult<OrderPage> {
        let (page, limit, offset) = page_bounds(filter.page, filter.limit);

        let mut count_qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM pedidos WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.base.pool())
            .await?;

        let mut stats_qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT COUNT(*) AS cantidad, COALESCE(SUM(total), 0) AS suma_total, \
             COALESCE(AVG(total), 0.0) AS promedio_total FROM pedidos WHERE 1=1",
        );
        push_filters(&mut stats_qb, filter);
        let stats: OrderAggregates = stats_qb
            .build_query_as()
            .fetch_one(self.base.pool())
            .await?;

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT * FROM pedidos WHERE 1=1");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let orders: Vec<Order> = qb.build_query_as().fetch_all(self.base.pool()).await?;

        let mut items = Vec::with_capacity(orders.len());
        for pedido in orders {
            let pedido_items = self.items_for(&pedido.id).await?;
            items.push(OrderDetail {
                pedido,
                items: pedido_items,
            });
        }

        Ok(OrderPage {
            items,
            total,
            page,
            limit,
            stats,
        })
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    if let Some(estado) = filter.estado {
        qb.push(" AND estado_pedido = ");
        qb.push_bind(estado);
    }
    if let Some(inicio) = filter.fecha_inicio {
        qb.push(" AND created_at >= ");
        qb.push_bind(inicio);
    }
    if let Some(fin) = filter.fecha_fin {
        qb.push(" AND created_at <= ");
        qb.push_bind(fin);
    }
    if let Some(search) = &filter.search
        && !search.trim().is_empty()
    {
        let pattern = format!("%{}%", search.trim().to_lowercase());
        qb.push(" AND (LOWER(numero_pedido) LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR LOWER(cliente_nombre) LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR LOWER(cliente_email) LIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

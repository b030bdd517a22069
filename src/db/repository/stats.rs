//! Statistics Repository
//!
//! Reporting queries for the admin dashboard. The aggregation (GROUP BY
//! month/product/category/customer with SUM/COUNT) is the contract; all of
//! it runs in the database.

use super::{BaseRepository, RepoResult};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

/// Monthly sales data point (`mes` = `YYYY-MM`)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthlySales {
    pub mes: String,
    pub cantidad: i64,
    pub total: i64,
}

/// Top product by units sold across paid orders
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: String,
    pub nombre: String,
    pub unidades_vendidas: i64,
    pub ingresos: i64,
}

/// Top category by revenue across paid orders
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopCategory {
    pub id: String,
    pub nombre: String,
    pub unidades_vendidas: i64,
    pub ingresos: i64,
}

/// Top customer by spend across paid orders
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomer {
    pub cliente_email: String,
    pub cliente_nombre: String,
    pub pedidos: i64,
    pub total_gastado: i64,
}

#[derive(Clone)]
pub struct StatsRepository {
    base: BaseRepository,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// Revenue from delivered orders since `desde`.
    pub async fn total_ventas(&self, desde: DateTime<Utc>) -> RepoResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total), 0) FROM pedidos \
             WHERE estado_pedido = 'ENTREGADO' AND created_at >= ?",
        )
        .bind(desde)
        .fetch_one(self.base.pool())
        .await?;
        Ok(total)
    }

    pub async fn total_pedidos(&self, desde: DateTime<Utc>) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pedidos WHERE created_at >= ?")
            .bind(desde)
            .fetch_one(self.base.pool())
            .await?;
        Ok(count)
    }

    pub async fn pedidos_pendientes(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pedidos WHERE estado_pedido = 'PENDIENTE'",
        )
        .fetch_one(self.base.pool())
        .await?;
        Ok(count)
    }

    pub async fn total_productos_activos(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE activo = 1")
            .fetch_one(self.base.pool())
            .await?;
        Ok(count)
    }

    pub async fn productos_bajo_stock(&self) -> RepoResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE activo = 1 AND stock < 10")
                .fetch_one(self.base.pool())
                .await?;
        Ok(count)
    }

    /// Last 12 months of delivered-and-paid sales, newest month first.
    pub async fn ventas_mensuales(&self) -> RepoResult<Vec<MonthlySales>> {
        let desde = Utc::now() - Duration::days(365);
        let series = sqlx::query_as::<_, MonthlySales>(
            "SELECT strftime('%Y-%m', created_at) AS mes, COUNT(*) AS cantidad, \
             COALESCE(SUM(total), 0) AS total \
             FROM pedidos \
             WHERE estado_pedido = 'ENTREGADO' AND estado_pago = 'PAGADO' AND created_at >= ? \
             GROUP BY mes ORDER BY mes DESC LIMIT 12",
        )
        .bind(desde)
        .fetch_all(self.base.pool())
        .await?;
        Ok(series)
    }

    pub async fn productos_mas_vendidos(&self, limit: i64) -> RepoResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            "SELECT pi.producto_id AS id, pi.nombre AS nombre, \
             SUM(pi.cantidad) AS unidades_vendidas, SUM(pi.subtotal) AS ingresos \
             FROM pedido_items pi JOIN pedidos p ON p.id = pi.pedido_id \
             WHERE p.estado_pago = 'PAGADO' \
             GROUP BY pi.producto_id, pi.nombre \
             ORDER BY unidades_vendidas DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.base.pool())
        .await?;
        Ok(rows)
    }

    pub async fn categorias_mas_vendidas(&self, limit: i64) -> RepoResult<Vec<TopCategory>> {
        let rows = sqlx::query_as::<_, TopCategory>(
            "SELECT c.id AS id, c.nombre AS nombre, \
             SUM(pi.cantidad) AS unidades_vendidas, SUM(pi.subtotal) AS ingresos \
             FROM pedido_items pi \
             JOIN pedidos p ON p.id = pi.pedido_id \
             JOIN productos pr ON pr.id = pi.producto_id \
             JOIN categorias c ON c.id = pr.categoria_id \
             WHERE p.estado_pago = 'PAGADO' \
             GROUP BY c.id, c.nombre \
             ORDER BY ingresos DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.base.pool())
        .await?;
        Ok(rows)
    }

    pub async fn mejores_clientes(&self, limit: i64) -> RepoResult<Vec<TopCustomer>> {
        let rows = sqlx::query_as::<_, TopCustomer>(
            "SELECT cliente_email, cliente_nombre, COUNT(*) AS pedidos, \
             COALESCE(SUM(total), 0) AS total_gastado \
             FROM pedidos WHERE estado_pago = 'PAGADO' \
             GROUP BY cliente_email, cliente_nombre \
             ORDER BY total_gastado DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.base.pool())
        .await?;
        Ok(rows)
    }
}

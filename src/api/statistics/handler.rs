//! Statistics API Handlers

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::repository::StatsRepository;
use crate::db::repository::stats::{MonthlySales, TopCategory, TopCustomer, TopProduct};
use crate::utils::AppResult;

const TOP_LIMIT: i64 = 5;

#[derive(Debug, Deserialize)]
pub struct StatisticsQuery {
    /// dia | semana | mes | año (default mes)
    pub periodo: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodInfo {
    pub actual: String,
    pub fecha_inicio: String,
    pub fecha_fin: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsResponse {
    pub total_ventas: i64,
    pub ventas_mensuales: Vec<MonthlySales>,
    pub productos_mas_vendidos: Vec<TopProduct>,
    pub total_pedidos: i64,
    pub pedidos_pendientes: i64,
    pub total_productos: i64,
    pub productos_bajo_stock: i64,
    pub categorias_mas_vendidas: Vec<TopCategory>,
    pub mejores_clientes: Vec<TopCustomer>,
    pub periodo: PeriodInfo,
}

/// Period start for the headline figures
fn start_date(periodo: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    match periodo {
        "dia" => now - Duration::days(1),
        "semana" => now - Duration::days(7),
        "mes" => now.checked_sub_months(Months::new(1)).unwrap_or(now),
        "año" => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        _ => now.checked_sub_months(Months::new(1)).unwrap_or(now),
    }
}

/// GET /api/admin/estadisticas - 后台统计总览
pub async fn get_statistics(
    State(state): State<ServerState>,
    Query(query): Query<StatisticsQuery>,
) -> AppResult<Json<StatisticsResponse>> {
    let periodo = query.periodo.unwrap_or_else(|| "mes".to_string());
    let now = Utc::now();
    let desde = start_date(&periodo, now);

    tracing::debug!(periodo = %periodo, desde = %desde, "Fetching statistics");

    let stats = StatsRepository::new(state.pool.clone());

    let total_ventas = stats.total_ventas(desde).await?;
    let ventas_mensuales = stats.ventas_mensuales().await?;
    let productos_mas_vendidos = stats.productos_mas_vendidos(TOP_LIMIT).await?;
    let total_pedidos = stats.total_pedidos(desde).await?;
    let pedidos_pendientes = stats.pedidos_pendientes().await?;
    let total_productos = stats.total_productos_activos().await?;
    let productos_bajo_stock = stats.productos_bajo_stock().await?;
    let categorias_mas_vendidas = stats.categorias_mas_vendidas(TOP_LIMIT).await?;
    let mejores_clientes = stats.mejores_clientes(TOP_LIMIT).await?;

    Ok(Json(StatisticsResponse {
        total_ventas,
        ventas_mensuales,
        productos_mas_vendidos,
        total_pedidos,
        pedidos_pendientes,
        total_productos,
        productos_bajo_stock,
        categorias_mas_vendidas,
        mejores_clientes,
        periodo: PeriodInfo {
            actual: periodo,
            fecha_inicio: desde.to_rfc3339(),
            fecha_fin: now.to_rfc3339(),
        },
    }))
}

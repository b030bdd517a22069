//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/health | GET | 数据库探活 + 分类计数 | 无 |

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Serialize;
use std::time::SystemTime;

use crate::core::ServerState;
use crate::db::repository::CategoryRepository;

/// 健康检查路由 - 公共路由 (无需认证)
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Serialize)]
struct ServiceChecks {
    database: &'static str,
    api: &'static str,
}

#[derive(Serialize)]
struct HealthMetrics {
    categories: i64,
    uptime_seconds: u64,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
    services: ServiceChecks,
    metrics: Option<HealthMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// 服务器启动时间 (懒加载静态变量)
static START_TIME: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

fn uptime_seconds() -> u64 {
    let start = START_TIME.get_or_init(SystemTime::now);
    SystemTime::now()
        .duration_since(*start)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// 数据库往返探活；失败时返回 503
async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    let probe = async {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&state.pool)
            .await?;
        CategoryRepository::new(state.pool.clone())
            .count()
            .await
            .map_err(|e| sqlx::Error::Protocol(e.to_string()))
    };

    match probe.await {
        Ok(categories) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                version: env!("CARGO_PKG_VERSION"),
                timestamp: Utc::now().to_rfc3339(),
                services: ServiceChecks {
                    database: "connected",
                    api: "operational",
                },
                metrics: Some(HealthMetrics {
                    categories,
                    uptime_seconds: uptime_seconds(),
                }),
                error: None,
            }),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unhealthy",
                    version: env!("CARGO_PKG_VERSION"),
                    timestamp: Utc::now().to_rfc3339(),
                    services: ServiceChecks {
                        database: "disconnected",
                        api: "degraded",
                    },
                    metrics: None,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

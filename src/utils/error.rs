//! 统一错误处理
//!
//! 提供应用级错误类型和 HTTP 响应映射：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResult`] - 处理器的 Result 类型别名
//!
//! # 错误分类
//!
//! | 变体 | HTTP | 说明 |
//! |------|------|------|
//! | Validation | 400 | 请求数据无效 (含字段级 details) |
//! | Conflict | 400 | 业务冲突 (库存不足、SKU/slug 重复、分类被占用) |
//! | Unauthorized | 401 | 未登录或权限不足 |
//! | NotFound | 404 | 资源不存在 |
//! | Upstream | 500 | 支付网关等上游失败 |
//! | Database / Internal | 500 | 系统错误 (记录日志，不泄露内部信息) |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::db::repository::RepoError;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    /// 验证失败 (400)
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("No autorizado")]
    /// 未登录或权限不足 (401)
    Unauthorized,

    #[error("Credenciales inválidas")]
    /// 登录失败 (401, 统一消息防止用户名枚举)
    InvalidCredentials,

    #[error("Conflict: {0}")]
    /// 业务冲突 (400)
    Conflict(String),

    #[error("Upstream error: {0}")]
    /// 上游服务失败 (500)
    Upstream(String),

    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

/// API 错误响应体: `{"error": "...", "details": {...}}`
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Validation { message, details } => {
                (StatusCode::BAD_REQUEST, message, details)
            }
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "No autorizado".to_string(), None)
            }
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Credenciales inválidas".to_string(),
                None,
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Upstream(msg) => {
                error!(target: "upstream", error = %msg, "Upstream service error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error interno del servidor".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error interno del servidor".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorBody {
            error: message,
            details,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream(message.into())
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Conflict(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Recurso no encontrado".to_string()),
            other => AppError::Database(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation {
            message: "Datos inválidos".to_string(),
            details: serde_json::to_value(&errors).ok(),
        }
    }
}

/// 处理器的 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

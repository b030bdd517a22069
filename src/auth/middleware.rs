//! 认证中间件
//!
//! # 错误处理
//!
//! | 错误 | HTTP 状态码 |
//! |------|------------|
//! | 无 Authorization 头 | 401 |
//! | 令牌过期/无效 | 401 |
//! | 非 ADMIN 角色 | 401 |

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// 管理接口认证中间件 - 要求已登录且角色为 ADMIN
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT，
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
pub async fn require_admin(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or(AppError::Unauthorized)?
        }
        None => {
            tracing::warn!(target: "security", uri = %req.uri(), "auth_missing");
            return Err(AppError::Unauthorized);
        }
    };

    let claims = state.jwt_service.validate_token(token).map_err(|e| {
        tracing::warn!(target: "security", error = %e, uri = %req.uri(), "auth_failed");
        AppError::Unauthorized
    })?;

    let user = CurrentUser::from(claims);
    if !user.is_admin() {
        tracing::warn!(target: "security", user = %user.email, uri = %req.uri(), "forbidden");
        return Err(AppError::Unauthorized);
    }

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

//! Auth API Handlers

use axum::{Json, extract::State};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::auth::password::verify_password;
use crate::core::ServerState;
use crate::db::models::{LoginRequest, LoginResponse, UserPublic};
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};

/// POST /api/auth/login - 邮箱密码登录，返回 JWT
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    payload.validate()?;

    let repo = UserRepository::new(state.pool.clone());
    let user = repo
        .find_by_email(&payload.email)
        .await?
        .filter(|u| u.activo)
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&payload.password, &user.password_hash) {
        tracing::warn!(target: "security", email = %payload.email, "login_failed");
        return Err(AppError::InvalidCredentials);
    }

    let token = state
        .jwt_service
        .generate_token(&user)
        .map_err(|e| AppError::internal(e.to_string()))?;

    tracing::info!(target: "security", user = %user.email, "login_ok");

    Ok(Json(LoginResponse {
        token,
        usuario: user.public(),
    }))
}

/// GET /api/auth/me - 当前登录用户
pub async fn me(user: CurrentUser) -> Json<UserPublic> {
    Json(UserPublic {
        id: user.id,
        email: user.email,
        nombre: user.nombre,
        role: user.role,
    })
}

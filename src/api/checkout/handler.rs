//! Checkout API Handlers

use axum::{Json, extract::State};

use crate::checkout::{CheckoutRequest, CheckoutResponse, CheckoutService};
use crate::core::ServerState;
use crate::utils::AppResult;

/// POST /api/pagos/crear-sesion - 创建托管支付会话
pub async fn create_session(
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutResponse>> {
    let service = CheckoutService::new(
        state.pool.clone(),
        state.gateway.clone(),
        state.config.checkout_config(),
    );
    let response = service.create_session(payload).await?;
    Ok(Json(response))
}

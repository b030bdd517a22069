//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{Category, CategoryCreate, CategoryDetail, CategoryUpdate};
use crate::db::repository::CategoryRepository;
use crate::utils::{AppError, AppResult};

/// GET /api/categorias - 获取启用的分类 (按显示顺序)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Category>>> {
    let repo = CategoryRepository::new(state.pool.clone());
    let categories = repo.find_all_active().await?;
    Ok(Json(categories))
}

/// GET /api/categorias/:id - 获取单个分类 (含商品计数)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CategoryDetail>> {
    let repo = CategoryRepository::new(state.pool.clone());
    let detail = repo
        .find_detail(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Categoría no encontrada".to_string()))?;
    Ok(Json(detail))
}

/// POST /api/categorias - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<Category>)> {
    payload.validate()?;

    let repo = CategoryRepository::new(state.pool.clone());
    let categoria = repo.create(payload).await?;
    Ok((StatusCode::CREATED, Json(categoria)))
}

/// PUT /api/categorias/:id - 更新分类 (改名时重新生成 slug)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<Category>> {
    payload.validate()?;

    let repo = CategoryRepository::new(state.pool.clone());
    let categoria = repo.update(&id, payload).await?;
    Ok(Json(categoria))
}

/// DELETE /api/categorias/:id - 删除分类 (有关联商品时拒绝)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = CategoryRepository::new(state.pool.clone());
    repo.delete(&id).await?;
    Ok(Json(true))
}

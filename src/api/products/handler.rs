//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::ServerState;
use crate::db::models::{ProductCreate, ProductDetail, ProductListItem, ProductUpdate};
use crate::db::repository::{ProductFilter, ProductRepository, StockBucket};
use crate::utils::{AppError, AppResult};

/// Catalog listing query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub search: Option<String>,
    pub categoria: Option<String>,
    /// agotado | bajo | disponible
    pub stock: Option<String>,
    pub activo: Option<bool>,
    pub precio_min: Option<i64>,
    pub precio_max: Option<i64>,
    /// Comma-separated size list
    pub tallas: Option<String>,
    /// Comma-separated color list
    pub colores: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

fn split_csv(value: Option<String>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

impl ProductQuery {
    fn into_filter(self) -> AppResult<ProductFilter> {
        let stock = match self.stock.as_deref() {
            Some(value) => Some(
                value
                    .parse::<StockBucket>()
                    .map_err(AppError::validation)?,
            ),
            None => None,
        };

        Ok(ProductFilter {
            search: self.search,
            categoria_id: self.categoria,
            precio_min: self.precio_min,
            precio_max: self.precio_max,
            stock,
            activo: self.activo,
            tallas: split_csv(self.tallas),
            colores: split_csv(self.colores),
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
pub struct ProductListResponse {
    pub productos: Vec<ProductListItem>,
    pub pagination: Pagination,
}

/// GET /api/productos - 商品列表 (过滤 + 分页)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ProductListResponse>> {
    let filter = query.into_filter()?;
    let repo = ProductRepository::new(state.pool.clone());
    let page = repo.find_page(&filter).await?;

    let pages = if page.total > 0 {
        (page.total + page.limit - 1) / page.limit
    } else {
        1
    };

    Ok(Json(ProductListResponse {
        productos: page.items,
        pagination: Pagination {
            total: page.total,
            page: page.page,
            limit: page.limit,
            pages,
        },
    }))
}

async fn detail_for(repo: &ProductRepository, producto: crate::db::models::Product) -> AppResult<ProductDetail> {
    let variantes = repo.variants_for(&producto.id).await?;
    let categoria_nombre = repo.category_name(&producto.categoria_id).await?;
    Ok(ProductDetail::new(producto, categoria_nombre, variantes))
}

/// GET /api/productos/:id - 商品详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductDetail>> {
    let repo = ProductRepository::new(state.pool.clone());
    let producto = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Producto {id} no encontrado")))?;
    Ok(Json(detail_for(&repo, producto).await?))
}

/// GET /api/productos/slug/:slug - 店面按 slug 获取商品
pub async fn get_by_slug(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ProductDetail>> {
    let repo = ProductRepository::new(state.pool.clone());
    let producto = repo
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::not_found("Producto no encontrado".to_string()))?;
    Ok(Json(detail_for(&repo, producto).await?))
}

/// POST /api/productos - 创建商品 (含变体)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<ProductDetail>)> {
    payload.validate()?;

    let repo = ProductRepository::new(state.pool.clone());
    let producto = repo.create(payload).await?;
    let detail = detail_for(&repo, producto).await?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/productos/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductDetail>> {
    payload.validate()?;

    let repo = ProductRepository::new(state.pool.clone());
    let producto = repo.update(&id, payload).await?;
    Ok(Json(detail_for(&repo, producto).await?))
}

/// DELETE /api/productos/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ProductRepository::new(state.pool.clone());
    repo.delete(&id).await?;
    Ok(Json(true))
}

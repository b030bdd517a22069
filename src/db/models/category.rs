//! Category Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub nombre: String,
    pub slug: String,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    pub orden: i64,
    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create category payload
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    #[validate(length(min = 1, max = 100))]
    pub nombre: String,
    /// Generated from `nombre` when omitted
    pub slug: Option<String>,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    #[serde(default)]
    pub orden: i64,
    #[serde(default = "default_true")]
    pub activo: bool,
}

/// Update category payload (partial)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[validate(length(min = 1, max = 100))]
    pub nombre: Option<String>,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    pub orden: Option<i64>,
    pub activo: Option<bool>,
}

/// Category with its product count, for the admin detail view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub categoria: Category,
    pub productos_count: i64,
}

fn default_true() -> bool {
    true
}

//! Product and Variant Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use validator::Validate;

use crate::utils::pricing::{StockStatus, calculate_discount, stock_status};

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub nombre: String,
    pub slug: String,
    pub descripcion_corta: String,
    pub descripcion_larga: Option<String>,
    /// Price in minor units
    pub precio: i64,
    /// Pre-discount price, for strikethrough display
    pub precio_original: Option<i64>,
    pub sku: String,
    pub stock: i64,
    pub stock_minimo: i64,
    pub imagenes: Json<Vec<String>>,
    pub tallas: Json<Vec<String>>,
    pub colores: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
    pub destacado: bool,
    pub activo: bool,
    pub categoria_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Discount percentage against `precio_original`, 0 when none applies.
    pub fn descuento(&self) -> i64 {
        self.precio_original
            .map(|original| calculate_discount(original, self.precio))
            .unwrap_or(0)
    }

    pub fn estado_stock(&self) -> StockStatus {
        stock_status(self.stock, self.stock_minimo)
    }
}

/// Variant entity - a (talla, color) combination with its own stock
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub producto_id: String,
    pub talla: String,
    pub color: String,
    pub stock: i64,
    /// Price override; falls back to the product price when None
    pub precio: Option<i64>,
    pub sku: String,
}

/// Create product payload
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    #[validate(length(min = 3, max = 200))]
    pub nombre: String,
    #[validate(length(min = 10, max = 500))]
    pub descripcion_corta: String,
    pub descripcion_larga: Option<String>,
    #[validate(range(min = 0))]
    pub precio: i64,
    pub precio_original: Option<i64>,
    pub categoria_id: String,
    #[validate(length(min = 3, max = 50))]
    pub sku: String,
    #[validate(range(min = 0))]
    pub stock: i64,
    #[serde(default = "default_stock_minimo")]
    #[validate(range(min = 1))]
    pub stock_minimo: i64,
    #[serde(default)]
    pub imagenes: Vec<String>,
    #[serde(default)]
    pub tallas: Vec<String>,
    #[serde(default)]
    pub colores: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub destacado: bool,
    #[serde(default = "default_true")]
    pub activo: bool,
    #[serde(default)]
    #[validate(nested)]
    pub variantes: Vec<VariantCreate>,
}

/// Create variant payload (nested under product create/update)
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VariantCreate {
    pub talla: String,
    pub color: String,
    #[validate(range(min = 0))]
    pub stock: i64,
    pub precio: Option<i64>,
    pub sku: String,
}

/// Update product payload (partial)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[validate(length(min = 3, max = 200))]
    pub nombre: Option<String>,
    #[validate(length(min = 10, max = 500))]
    pub descripcion_corta: Option<String>,
    pub descripcion_larga: Option<String>,
    #[validate(range(min = 0))]
    pub precio: Option<i64>,
    pub precio_original: Option<i64>,
    pub categoria_id: Option<String>,
    #[validate(length(min = 3, max = 50))]
    pub sku: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub stock_minimo: Option<i64>,
    pub imagenes: Option<Vec<String>>,
    pub tallas: Option<Vec<String>>,
    pub colores: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub destacado: Option<bool>,
    pub activo: Option<bool>,
    /// Replaces the full variant set when present
    #[validate(nested)]
    pub variantes: Option<Vec<VariantCreate>>,
}

/// Product row for listings, with the joined category name
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub producto: Product,
    pub categoria_nombre: Option<String>,
}

/// Product detail with variants, for the detail endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub producto: Product,
    pub categoria_nombre: Option<String>,
    pub variantes: Vec<Variant>,
    pub descuento: i64,
    pub estado_stock: StockStatus,
}

impl ProductDetail {
    pub fn new(producto: Product, categoria_nombre: Option<String>, variantes: Vec<Variant>) -> Self {
        let descuento = producto.descuento();
        let estado_stock = producto.estado_stock();
        Self {
            producto,
            categoria_nombre,
            variantes,
            descuento,
            estado_stock,
        }
    }
}

fn default_stock_minimo() -> i64 {
    10
}

fn default_true() -> bool {
    true
}

//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, page_bounds};
use crate::db::models::{Product, ProductCreate, ProductListItem, ProductUpdate, Variant};
use crate::utils::slug::slugify_unique;
use chrono::Utc;
use sqlx::sqlite::SqliteConnection;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

/// Fallback image used when a product is created without any
const DEFAULT_IMAGE: &str =
    "https://images.unsplash.com/photo-1523381210434-271e8be1f52b?auto=format&fit=crop&w=800&q=80";

/// Stock filter buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockBucket {
    /// stock = 0
    Agotado,
    /// 0 < stock < 10
    Bajo,
    /// stock > 0
    Disponible,
}

impl FromStr for StockBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agotado" => Ok(StockBucket::Agotado),
            "bajo" => Ok(StockBucket::Bajo),
            "disponible" => Ok(StockBucket::Disponible),
            other => Err(format!("filtro de stock inválido: {other}")),
        }
    }
}

/// Composable catalog filter; all fields optional
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub categoria_id: Option<String>,
    pub precio_min: Option<i64>,
    pub precio_max: Option<i64>,
    pub stock: Option<StockBucket>,
    pub activo: Option<bool>,
    pub tallas: Vec<String>,
    pub colores: Vec<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// One page of catalog results
#[derive(Debug)]
pub struct ProductPage {
    pub items: Vec<ProductListItem>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// Filtered, paginated listing with the joined category name.
    /// Fixed ordering: newest first.
    pub async fn find_page(&self, filter: &ProductFilter) -> RepoResult<ProductPage> {
        let (page, limit, offset) = page_bounds(filter.page, filter.limit);

        let mut count_qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM productos p WHERE 1=1");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.base.pool())
            .await?;

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT p.*, c.nombre AS categoria_nombre \
             FROM productos p LEFT JOIN categorias c ON c.id = p.categoria_id WHERE 1=1",
        );
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ");
        qb.push_bind(limit);
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let items: Vec<ProductListItem> =
            qb.build_query_as().fetch_all(self.base.pool()).await?;

        Ok(ProductPage {
            items,
            total,
            page,
            limit,
        })
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM productos WHERE id = ?")
            .bind(id)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(product)
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM productos WHERE slug = ?")
            .bind(slug)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(product)
    }

    pub async fn variants_for(&self, producto_id: &str) -> RepoResult<Vec<Variant>> {
        let variants = sqlx::query_as::<_, Variant>(
            "SELECT * FROM variantes WHERE producto_id = ? ORDER BY talla, color",
        )
        .bind(producto_id)
        .fetch_all(self.base.pool())
        .await?;
        Ok(variants)
    }

    pub async fn category_name(&self, categoria_id: &str) -> RepoResult<Option<String>> {
        let nombre: Option<String> =
            sqlx::query_scalar("SELECT nombre FROM categorias WHERE id = ?")
                .bind(categoria_id)
                .fetch_optional(self.base.pool())
                .await?;
        Ok(nombre)
    }

    /// Create a new product with its variants
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let sku_taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE sku = ?")
            .bind(&data.sku)
            .fetch_one(self.base.pool())
            .await?;
        if sku_taken > 0 {
            return Err(RepoError::Duplicate("El SKU ya está en uso".to_string()));
        }

        let category_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categorias WHERE id = ?")
                .bind(&data.categoria_id)
                .fetch_one(self.base.pool())
                .await?;
        if category_exists == 0 {
            return Err(RepoError::Validation(
                "Categoría no encontrada".to_string(),
            ));
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let slug = slugify_unique(&data.nombre, now.timestamp_millis());
        let imagenes = if data.imagenes.is_empty() {
            vec![DEFAULT_IMAGE.to_string()]
        } else {
            data.imagenes
        };

        let mut tx = self.base.pool().begin().await?;

        sqlx::query(
            "INSERT INTO productos (id, nombre, slug, descripcion_corta, descripcion_larga, \
             precio, precio_original, sku, stock, stock_minimo, imagenes, tallas, colores, tags, \
             destacado, activo, categoria_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&data.nombre)
        .bind(&slug)
        .bind(&data.descripcion_corta)
        .bind(&data.descripcion_larga)
        .bind(data.precio)
        .bind(data.precio_original)
        .bind(&data.sku)
        .bind(data.stock)
        .bind(data.stock_minimo)
        .bind(Json(&imagenes))
        .bind(Json(&data.tallas))
        .bind(Json(&data.colores))
        .bind(Json(&data.tags))
        .bind(data.destacado)
        .bind(data.activo)
        .bind(&data.categoria_id)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for variante in &data.variantes {
            sqlx::query(
                "INSERT INTO variantes (id, producto_id, talla, color, stock, precio, sku) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&id)
            .bind(&variante.talla)
            .bind(&variante.color)
            .bind(variante.stock)
            .bind(variante.precio)
            .bind(&variante.sku)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::Duplicate(
                    format!("Variante duplicada: {} / {}", variante.talla, variante.color),
                ),
                other => RepoError::from(other),
            })?;
        }

        tx.commit().await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Partial update. A provided `variantes` list replaces the whole set.
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Producto {id} no encontrado")))?;

        if let Some(ref sku) = data.sku
            && *sku != existing.sku
        {
            let taken: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE sku = ? AND id != ?")
                    .bind(sku)
                    .bind(id)
                    .fetch_one(self.base.pool())
                    .await?;
            if taken > 0 {
                return Err(RepoError::Duplicate("El SKU ya está en uso".to_string()));
            }
        }

        let mut tx = self.base.pool().begin().await?;

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new("UPDATE productos SET updated_at = ");
        qb.push_bind(Utc::now());
        if let Some(v) = &data.nombre {
            qb.push(", nombre = ");
            qb.push_bind(v);
        }
        if let Some(v) = &data.descripcion_corta {
            qb.push(", descripcion_corta = ");
            qb.push_bind(v);
        }
        if let Some(v) = &data.descripcion_larga {
            qb.push(", descripcion_larga = ");
            qb.push_bind(v);
        }
        if let Some(v) = data.precio {
            qb.push(", precio = ");
            qb.push_bind(v);
        }
        if let Some(v) = data.precio_original {
            qb.push(", precio_original = ");
            qb.push_bind(v);
        }
        if let Some(v) = &data.categoria_id {
            qb.push(", categoria_id = ");
            qb.push_bind(v);
        }
        if let Some(v) = &data.sku {
            qb.push(", sku = ");
            qb.push_bind(v);
        }
        if let Some(v) = data.stock {
            qb.push(", stock = ");
            qb.push_bind(v);
        }
        if let Some(v) = data.stock_minimo {
            qb.push(", stock_minimo = ");
            qb.push_bind(v);
        }
        if let Some(v) = &data.imagenes {
            qb.push(", imagenes = ");
            qb.push_bind(Json(v));
        }
        if let Some(v) = &data.tallas {
            qb.push(", tallas = ");
            qb.push_bind(Json(v));
        }
        if let Some(v) = &data.colores {
            qb.push(", colores = ");
            qb.push_bind(Json(v));
        }
        if let Some(v) = &data.tags {
            qb.push(", tags = ");
            qb.push_bind(Json(v));
        }
        if let Some(v) = data.destacado {
            qb.push(", destacado = ");
            qb.push_bind(v);
        }
        if let Some(v) = data.activo {
            qb.push(", activo = ");
            qb.push_bind(v);
        }
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.build().execute(&mut *tx).await?;

        if let Some(variantes) = &data.variantes {
            sqlx::query("DELETE FROM variantes WHERE producto_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for variante in variantes {
                sqlx::query(
                    "INSERT INTO variantes (id, producto_id, talla, color, stock, precio, sku) \
                     VALUES (?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(Uuid::new_v4().to_string())
                .bind(id)
                .bind(&variante.talla)
                .bind(&variante.color)
                .bind(variante.stock)
                .bind(variante.precio)
                .bind(&variante.sku)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Producto {id} no encontrado")))
    }

    /// Hard delete; rejected while order items still reference the product.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let referenced: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pedido_items WHERE producto_id = ?")
                .bind(id)
                .fetch_one(self.base.pool())
                .await?;
        if referenced > 0 {
            return Err(RepoError::Conflict(
                "No se puede eliminar el producto porque tiene pedidos asociados".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM productos WHERE id = ?")
            .bind(id)
            .execute(self.base.pool())
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("Producto {id} no encontrado")));
        }
        Ok(())
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ProductFilter) {
    if let Some(search) = &filter.search
        && !search.trim().is_empty()
    {
        let pattern = format!("%{}%", search.trim().to_lowercase());
        qb.push(" AND (LOWER(p.nombre) LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR LOWER(p.sku) LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR LOWER(p.descripcion_corta) LIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    if let Some(categoria_id) = &filter.categoria_id {
        qb.push(" AND p.categoria_id = ");
        qb.push_bind(categoria_id.clone());
    }

    if let Some(min) = filter.precio_min {
        qb.push(" AND p.precio >= ");
        qb.push_bind(min);
    }
    if let Some(max) = filter.precio_max {
        qb.push(" AND p.precio <= ");
        qb.push_bind(max);
    }

    match filter.stock {
        Some(StockBucket::Agotado) => {
            qb.push(" AND p.stock = 0");
        }
        Some(StockBucket::Bajo) => {
            qb.push(" AND p.stock > 0 AND p.stock < 10");
        }
        Some(StockBucket::Disponible) => {
            qb.push(" AND p.stock > 0");
        }
        None => {}
    }

    if let Some(activo) = filter.activo {
        qb.push(" AND p.activo = ");
        qb.push_bind(activo);
    }

    if !filter.tallas.is_empty() {
        qb.push(" AND EXISTS (SELECT 1 FROM variantes v WHERE v.producto_id = p.id AND v.talla IN (");
        let mut sep = qb.separated(", ");
        for talla in &filter.tallas {
            sep.push_bind(talla.clone());
        }
        qb.push("))");
    }

    if !filter.colores.is_empty() {
        qb.push(" AND EXISTS (SELECT 1 FROM variantes v WHERE v.producto_id = p.id AND v.color IN (");
        let mut sep = qb.separated(", ");
        for color in &filter.colores {
            sep.push_bind(color.clone());
        }
        qb.push("))");
    }
}

// =============================================================================
// Atomic stock decrements
// =============================================================================
//
// Conditional single-statement updates: the guard `stock >= ?` makes the
// decrement a no-op instead of ever driving stock negative, and rows_affected
// tells the caller whether it applied.

pub async fn decrement_product_stock(
    conn: &mut SqliteConnection,
    producto_id: &str,
    cantidad: i64,
) -> RepoResult<bool> {
    let result = sqlx::query("UPDATE productos SET stock = stock - ? WHERE id = ? AND stock >= ?")
        .bind(cantidad)
        .bind(producto_id)
        .bind(cantidad)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn decrement_variant_stock(
    conn: &mut SqliteConnection,
    variante_id: &str,
    cantidad: i64,
) -> RepoResult<bool> {
    let result = sqlx::query("UPDATE variantes SET stock = stock - ? WHERE id = ? AND stock >= ?")
        .bind(cantidad)
        .bind(variante_id)
        .bind(cantidad)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{CategoryCreate, VariantCreate};
    use crate::db::repository::CategoryRepository;

    async fn setup() -> (SqlitePool, String) {
        let db = DbService::open_in_memory().await.unwrap();
        let categories = CategoryRepository::new(db.pool.clone());
        let categoria = categories
            .create(CategoryCreate {
                nombre: "Camisetas".to_string(),
                slug: None,
                descripcion: None,
                imagen: None,
                orden: 0,
                activo: true,
            })
            .await
            .unwrap();
        (db.pool, categoria.id)
    }

    fn product_payload(categoria_id: &str, nombre: &str, sku: &str, precio: i64) -> ProductCreate {
        ProductCreate {
            nombre: nombre.to_string(),
            descripcion_corta: format!("{nombre} de algodón premium"),
            descripcion_larga: None,
            precio,
            precio_original: None,
            categoria_id: categoria_id.to_string(),
            sku: sku.to_string(),
            stock: 5,
            stock_minimo: 10,
            imagenes: vec![],
            tallas: vec![],
            colores: vec![],
            tags: vec![],
            destacado: false,
            activo: true,
            variantes: vec![],
        }
    }

    #[tokio::test]
    async fn test_create_assigns_slug_and_default_image() {
        let (pool, categoria_id) = setup().await;
        let repo = ProductRepository::new(pool);

        let product = repo
            .create(product_payload(&categoria_id, "Camiseta Básica", "SKU-001", 25990))
            .await
            .unwrap();

        assert!(product.slug.starts_with("camiseta-basica-"));
        assert_eq!(product.imagenes.0.len(), 1);
        assert_eq!(product.stock, 5);
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let (pool, categoria_id) = setup().await;
        let repo = ProductRepository::new(pool);

        repo.create(product_payload(&categoria_id, "Camiseta Uno", "SKU-001", 10000))
            .await
            .unwrap();
        let result = repo
            .create(product_payload(&categoria_id, "Camiseta Dos", "SKU-001", 12000))
            .await;

        assert!(matches!(result, Err(RepoError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_filter_by_search_and_bucket() {
        let (pool, categoria_id) = setup().await;
        let repo = ProductRepository::new(pool);

        repo.create(product_payload(&categoria_id, "Camiseta Azul", "SKU-001", 10000))
            .await
            .unwrap();
        let mut agotado = product_payload(&categoria_id, "Jeans Negro", "SKU-002", 40000);
        agotado.stock = 0;
        repo.create(agotado).await.unwrap();

        let page = repo
            .find_page(&ProductFilter {
                search: Some("camiseta".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].producto.nombre, "Camiseta Azul");

        let page = repo
            .find_page(&ProductFilter {
                stock: Some(StockBucket::Agotado),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].producto.sku, "SKU-002");

        let page = repo
            .find_page(&ProductFilter {
                stock: Some(StockBucket::Disponible),
                precio_min: Some(5000),
                precio_max: Some(20000),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].producto.sku, "SKU-001");
    }

    #[tokio::test]
    async fn test_filter_by_variant_talla() {
        let (pool, categoria_id) = setup().await;
        let repo = ProductRepository::new(pool);

        let mut with_variants = product_payload(&categoria_id, "Camiseta Tallas", "SKU-001", 10000);
        with_variants.variantes = vec![VariantCreate {
            talla: "M".to_string(),
            color: "Negro".to_string(),
            stock: 3,
            precio: None,
            sku: "SKU-001-M-N".to_string(),
        }];
        repo.create(with_variants).await.unwrap();
        repo.create(product_payload(&categoria_id, "Sin Variantes", "SKU-002", 10000))
            .await
            .unwrap();

        let page = repo
            .find_page(&ProductFilter {
                tallas: vec!["M".to_string(), "L".to_string()],
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].producto.sku, "SKU-001");
    }

    #[tokio::test]
    async fn test_pagination_bounds() {
        let (pool, categoria_id) = setup().await;
        let repo = ProductRepository::new(pool);

        for i in 0..5 {
            repo.create(product_payload(
                &categoria_id,
                &format!("Producto Nº {i}"),
                &format!("SKU-{i:03}"),
                10000 + i,
            ))
            .await
            .unwrap();
        }

        let page = repo
            .find_page(&ProductFilter {
                page: Some(2),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.page, 2);
    }

    #[tokio::test]
    async fn test_conditional_decrement_never_goes_negative() {
        let (pool, categoria_id) = setup().await;
        let repo = ProductRepository::new(pool.clone());
        let product = repo
            .create(product_payload(&categoria_id, "Camiseta Stock", "SKU-001", 10000))
            .await
            .unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(decrement_product_stock(&mut conn, &product.id, 3).await.unwrap());
        // 2 left; a decrement of 5 must be rejected, not clamped
        assert!(!decrement_product_stock(&mut conn, &product.id, 5).await.unwrap());
        drop(conn);

        let after = repo.find_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 2);
    }

    #[tokio::test]
    async fn test_update_replaces_variants() {
        let (pool, categoria_id) = setup().await;
        let repo = ProductRepository::new(pool);

        let mut payload = product_payload(&categoria_id, "Camiseta Variantes", "SKU-001", 10000);
        payload.variantes = vec![VariantCreate {
            talla: "S".to_string(),
            color: "Rojo".to_string(),
            stock: 1,
            precio: None,
            sku: "SKU-001-S-R".to_string(),
        }];
        let product = repo.create(payload).await.unwrap();

        let updated = repo
            .update(
                &product.id,
                ProductUpdate {
                    precio: Some(12000),
                    variantes: Some(vec![VariantCreate {
                        talla: "L".to_string(),
                        color: "Verde".to_string(),
                        stock: 7,
                        precio: Some(13000),
                        sku: "SKU-001-L-V".to_string(),
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.precio, 12000);

        let variantes = repo.variants_for(&product.id).await.unwrap();
        assert_eq!(variantes.len(), 1);
        assert_eq!(variantes[0].talla, "L");
        assert_eq!(variantes[0].precio, Some(13000));
    }
}

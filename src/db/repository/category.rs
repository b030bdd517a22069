//! Category Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Category, CategoryCreate, CategoryDetail, CategoryUpdate};
use crate::utils::slug::slugify;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    /// Storefront listing: active categories in display order
    pub async fn find_all_active(&self) -> RepoResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categorias WHERE activo = 1 ORDER BY orden, nombre",
        )
        .fetch_all(self.base.pool())
        .await?;
        Ok(categories)
    }

    /// Admin listing: every category
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let categories =
            sqlx::query_as::<_, Category>("SELECT * FROM categorias ORDER BY orden, nombre")
                .fetch_all(self.base.pool())
                .await?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categorias WHERE id = ?")
            .bind(id)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(category)
    }

    pub async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categorias WHERE slug = ?")
            .bind(slug)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(category)
    }

    pub async fn find_detail(&self, id: &str) -> RepoResult<Option<CategoryDetail>> {
        let Some(categoria) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let productos_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE categoria_id = ?")
                .bind(id)
                .fetch_one(self.base.pool())
                .await?;
        Ok(Some(CategoryDetail {
            categoria,
            productos_count,
        }))
    }

    pub async fn count(&self) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categorias")
            .fetch_one(self.base.pool())
            .await?;
        Ok(count)
    }

    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        let slug = match data.slug {
            Some(slug) => slug,
            None => slugify(&data.nombre),
        };
        if slug.is_empty() {
            return Err(RepoError::Validation("El slug es requerido".to_string()));
        }
        let slug = self.unique_slug(&slug, None).await?;

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO categorias (id, nombre, slug, descripcion, imagen, orden, activo, \
             created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&data.nombre)
        .bind(&slug)
        .bind(&data.descripcion)
        .bind(&data.imagen)
        .bind(data.orden)
        .bind(data.activo)
        .bind(now)
        .bind(now)
        .execute(self.base.pool())
        .await?;

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create category".to_string()))
    }

    /// Partial update; a renamed category gets a fresh unique slug.
    pub async fn update(&self, id: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Categoría no encontrada".to_string()))?;

        let nombre = data.nombre.unwrap_or(existing.nombre.clone());
        let slug = if nombre != existing.nombre {
            self.unique_slug(&slugify(&nombre), Some(id)).await?
        } else {
            existing.slug.clone()
        };

        sqlx::query(
            "UPDATE categorias SET nombre = ?, slug = ?, descripcion = ?, imagen = ?, orden = ?, \
             activo = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&nombre)
        .bind(&slug)
        .bind(data.descripcion.or(existing.descripcion))
        .bind(data.imagen.or(existing.imagen))
        .bind(data.orden.unwrap_or(existing.orden))
        .bind(data.activo.unwrap_or(existing.activo))
        .bind(Utc::now())
        .bind(id)
        .execute(self.base.pool())
        .await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Categoría no encontrada".to_string()))
    }

    /// Delete, rejected while products still belong to the category.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let existing = self.find_by_id(id).await?;
        if existing.is_none() {
            return Err(RepoError::NotFound("Categoría no encontrada".to_string()));
        }

        let productos: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM productos WHERE categoria_id = ?")
                .bind(id)
                .fetch_one(self.base.pool())
                .await?;
        if productos > 0 {
            return Err(RepoError::Conflict(
                "No se puede eliminar la categoría porque tiene productos asociados".to_string(),
            ));
        }

        sqlx::query("DELETE FROM categorias WHERE id = ?")
            .bind(id)
            .execute(self.base.pool())
            .await?;
        Ok(())
    }

    /// Probe `slug`, `slug-2`, `slug-3`… until one is free.
    async fn unique_slug(&self, base: &str, exclude_id: Option<&str>) -> RepoResult<String> {
        let mut candidate = base.to_string();
        let mut suffix = 2;
        loop {
            let taken: i64 = match exclude_id {
                Some(id) => {
                    sqlx::query_scalar("SELECT COUNT(*) FROM categorias WHERE slug = ? AND id != ?")
                        .bind(&candidate)
                        .bind(id)
                        .fetch_one(self.base.pool())
                        .await?
                }
                None => sqlx::query_scalar("SELECT COUNT(*) FROM categorias WHERE slug = ?")
                    .bind(&candidate)
                    .fetch_one(self.base.pool())
                    .await?,
            };
            if taken == 0 {
                return Ok(candidate);
            }
            candidate = format!("{base}-{suffix}");
            suffix += 1;
        }
    }
}

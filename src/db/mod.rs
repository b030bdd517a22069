//! Database Module
//!
//! Handles the SQLite connection pool, migrations and first-run bootstrap.

pub mod models;
pub mod repository;

use crate::auth::password::hash_password;
use crate::utils::AppError;
use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use uuid::Uuid;

/// Database service — owns a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Create a new database service with WAL mode
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        // Build connection options: WAL, foreign keys, normal sync
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| AppError::database(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON")
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        // busy_timeout: 写冲突时等待 5s 而非立即失败
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to set busy_timeout: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    /// In-memory database for tests. A single pooled connection keeps every
    /// query on the same in-memory instance.
    pub async fn open_in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(e.to_string()))?
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;

        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

/// First-run bootstrap: create the administrator account when the user table
/// is empty, so a fresh deployment can log into the back office.
pub async fn ensure_admin_user(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<(), AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let hash = hash_password(password).map_err(AppError::internal)?;
    sqlx::query(
        "INSERT INTO usuarios (id, email, nombre, password_hash, role, activo, created_at)
         VALUES (?, ?, ?, ?, 'ADMIN', 1, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(email)
    .bind("Administrador")
    .bind(hash)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    tracing::warn!(email = %email, "Created bootstrap admin user, change its password");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::db::repository::UserRepository;

    #[tokio::test]
    async fn test_file_backed_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tienda.db");
        let path = path.to_str().unwrap();

        {
            let db = DbService::new(path).await.unwrap();
            ensure_admin_user(&db.pool, "admin@modastyle.test", "segura123")
                .await
                .unwrap();
            db.pool.close().await;
        }

        let db = DbService::new(path).await.unwrap();
        let user = UserRepository::new(db.pool.clone())
            .find_by_email("admin@modastyle.test")
            .await
            .unwrap()
            .unwrap();
        assert!(user.is_admin());
        assert!(verify_password("segura123", &user.password_hash));
    }

    #[tokio::test]
    async fn test_admin_bootstrap_runs_once() {
        let db = DbService::open_in_memory().await.unwrap();
        ensure_admin_user(&db.pool, "admin@modastyle.test", "segura123")
            .await
            .unwrap();
        // Second call must not create a duplicate or overwrite the password
        ensure_admin_user(&db.pool, "otro@modastyle.test", "otra-clave")
            .await
            .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM usuarios")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}

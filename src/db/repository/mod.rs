//! Repository Module
//!
//! Provides CRUD operations over the SQLite schema, one repository per
//! aggregate.

pub mod category;
pub mod order;
pub mod product;
pub mod stats;
pub mod user;

pub use category::CategoryRepository;
pub use order::OrderRepository;
pub use product::{ProductFilter, ProductRepository, StockBucket};
pub use stats::StatsRepository;
pub use user::UserRepository;

use sqlx::SqlitePool;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".to_string()),
            other => RepoError::Database(other.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database pool reference
#[derive(Clone)]
pub struct BaseRepository {
    pool: SqlitePool,
}

impl BaseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Default page size shared by paginated listings
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Clamp caller-supplied pagination to sane bounds
pub fn page_bounds(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);
    let offset = (page - 1) * limit;
    (page, limit, offset)
}

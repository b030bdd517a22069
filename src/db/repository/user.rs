//! User Repository

use super::{BaseRepository, RepoResult};
use crate::db::models::User;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            base: BaseRepository::new(pool),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE email = ?")
            .bind(email)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = ?")
            .bind(id)
            .fetch_optional(self.base.pool())
            .await?;
        Ok(user)
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::{Post, User};

/// Read access to posts and users.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn get_post(&self, post_id: i64) -> AppResult<Option<Post>>;

    /// Fails with `NotFound` when the user does not exist.
    async fn get_user(&self, user_id: i64) -> AppResult<User>;

    /// Missing ids are absent from the returned map.
    async fn get_users(&self, user_ids: &[i64]) -> AppResult<HashMap<i64, User>>;
}

/// Reads the `posts` and `users` tables directly.
#[derive(Clone)]
pub struct PgIdentityGateway {
    pool: PgPool,
}

impl PgIdentityGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityGateway for PgIdentityGateway {
    async fn get_post(&self, post_id: i64) -> AppResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>("SELECT id, user_id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn get_user(&self, user_id: i64) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    async fn get_users(&self, user_ids: &[i64]) -> AppResult<HashMap<i64, User>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let users = sqlx::query_as::<_, User>("SELECT id, name FROM users WHERE id = ANY($1)")
            .bind(user_ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users.into_iter().map(|u| (u.id, u)).collect())
    }
}

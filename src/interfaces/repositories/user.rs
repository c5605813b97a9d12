use std::sync::Arc;

use async_trait::async_trait;

use crate::{errors::AppError, repositories::sqlx_repo::SqlxUserRepo};

/// Read-only view of the user accounts owned by another service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_exists(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
impl<T> UserDirectory for Arc<T>
where
    T: UserDirectory + ?Sized,
{
    async fn user_exists(&self, id: i64) -> Result<bool, AppError> {
        (**self).user_exists(id).await
    }
}

impl SqlxUserRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxUserRepo { pool }
    }
}

#[async_trait]
impl UserDirectory for SqlxUserRepo {
    async fn user_exists(&self, id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        Ok(exists)
    }
}

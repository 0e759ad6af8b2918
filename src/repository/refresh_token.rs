use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{RefreshTokenCheck, RefreshTokenRepository};
use crate::error::AppError;

/// Refresh token records keyed by the namespaced token value itself.
pub struct PgRefreshTokenRepository {
    pool: PgPool,
}

impl PgRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenRepository for PgRefreshTokenRepository {
    async fn save(
        &self,
        account_id: Uuid,
        token_key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token_key, account_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(token_key)
        .bind(account_id)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_owner(&self, token_key: &str) -> Result<Option<Uuid>, AppError> {
        let owner = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT account_id
            FROM refresh_tokens
            WHERE token_key = $1 AND expires_at > $2
            "#,
        )
        .bind(token_key)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn validate(
        &self,
        token_key: &str,
        account_id: Uuid,
    ) -> Result<RefreshTokenCheck, AppError> {
        match self.find_owner(token_key).await? {
            None => Ok(RefreshTokenCheck::NotFoundOrExpired),
            Some(owner) if owner == account_id => Ok(RefreshTokenCheck::Valid),
            Some(_) => Ok(RefreshTokenCheck::OwnerMismatch),
        }
    }

    async fn delete(&self, token_key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token_key = $1")
            .bind(token_key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_all(&self, account_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

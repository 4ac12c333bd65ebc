use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::TokenEntity;

/// 令牌存储库实现
pub struct TokenRepository;

impl TokenRepository {
    pub async fn create(pool: &PgPool, token: &str, user_id: Uuid) -> Result<TokenEntity, sqlx::Error> {
        sqlx::query_as::<_, TokenEntity>(
            r#"
            INSERT INTO tokens (token, user_id)
            VALUES ($1, $2)
            RETURNING token, user_id, created_at
            "#,
        )
        .bind(token)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find(pool: &PgPool, token: &str) -> Result<Option<TokenEntity>, sqlx::Error> {
        sqlx::query_as::<_, TokenEntity>(
            "SELECT token, user_id, created_at FROM tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tokens WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 查找早于指定时间创建的令牌，旧的优先
    pub async fn find_created_before(
        pool: &PgPool,
        created_before: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT token FROM tokens
            WHERE created_at < $1
            ORDER BY created_at
            LIMIT $2
            "#,
        )
        .bind(created_before)
        .bind(i64::from(limit))
        .fetch_all(pool)
        .await
    }

    pub async fn delete_many(pool: &PgPool, tokens: &[String]) -> Result<u64, sqlx::Error> {
        if tokens.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM tokens WHERE token = ANY($1)")
            .bind(tokens)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{NewUser, TokenEntity, UserChanges, UserEntity};
use crate::database::repositories::{TokenRepository, UserRepository};

/// 存储层错误
///
/// 语义上的“不存在”用 `Ok(None)` 表示，这里只描述真正的失败。
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return StoreError::Conflict(db.constraint().unwrap_or("unique").to_string());
            }
        }
        StoreError::Unavailable(e)
    }
}

/// 用户与令牌的持久化存储
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert_user(&self, user: NewUser) -> Result<UserEntity, StoreError>;

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError>;

    /// 返回更新后的行；用户不存在时返回 `None`
    async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserEntity>, StoreError>;

    /// 删除用户，其令牌随外键级联删除
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, StoreError>;

    async fn insert_token(&self, token: &str, user_id: Uuid) -> Result<TokenEntity, StoreError>;

    async fn find_token(&self, token: &str) -> Result<Option<TokenEntity>, StoreError>;

    async fn delete_token(&self, token: &str) -> Result<bool, StoreError>;

    /// 按创建时间从旧到新返回早于 `created_before` 的令牌，最多 `limit` 个
    async fn select_stale_tokens(
        &self,
        created_before: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<String>, StoreError>;

    async fn delete_tokens(&self, tokens: &[String]) -> Result<u64, StoreError>;
}

/// 基于 PostgreSQL 的存储实现
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserEntity, StoreError> {
        Ok(UserRepository::create(&self.pool, &user).await?)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>, StoreError> {
        Ok(UserRepository::find_by_id(&self.pool, user_id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        Ok(UserRepository::find_by_email(&self.pool, email).await?)
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserEntity>, StoreError> {
        Ok(UserRepository::update(&self.pool, user_id, &changes).await?)
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        Ok(UserRepository::delete(&self.pool, user_id).await?)
    }

    async fn insert_token(&self, token: &str, user_id: Uuid) -> Result<TokenEntity, StoreError> {
        Ok(TokenRepository::create(&self.pool, token, user_id).await?)
    }

    async fn find_token(&self, token: &str) -> Result<Option<TokenEntity>, StoreError> {
        Ok(TokenRepository::find(&self.pool, token).await?)
    }

    async fn delete_token(&self, token: &str) -> Result<bool, StoreError> {
        Ok(TokenRepository::delete(&self.pool, token).await?)
    }

    async fn select_stale_tokens(
        &self,
        created_before: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<String>, StoreError> {
        Ok(TokenRepository::find_created_before(&self.pool, created_before, limit).await?)
    }

    async fn delete_tokens(&self, tokens: &[String]) -> Result<u64, StoreError> {
        Ok(TokenRepository::delete_many(&self.pool, tokens).await?)
    }
}

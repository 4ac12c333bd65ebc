use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// 会话令牌数据库实体
#[derive(Debug, Clone, FromRow)]
pub struct TokenEntity {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

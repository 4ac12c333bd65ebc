use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 用户角色，对应数据库枚举 `user_role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    User,
    SuperAdmin,
}

/// 用户数据库实体
///
/// 包含密码摘要，只在存储层与密码校验之间流转，对外一律转换为 `CachedUser`。
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub user_id: Uuid,
    pub user_name: String,
    pub password_digest: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建用户
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: Uuid,
    pub user_name: String,
    pub password_digest: String,
    pub email: String,
    pub role: UserRole,
}

/// 用户更新内容，`None` 表示保持原值
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password_digest: Option<String>,
    pub role: Option<UserRole>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{UserEntity, UserRole};

/// 用户缓存数据模型
///
/// 用户记录去掉密码摘要后的投影，缓存、鉴权以及接口响应只使用这一表示。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedUser {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CachedUser {
    pub fn is_super_admin(&self) -> bool {
        self.role == UserRole::SuperAdmin
    }
}

impl From<UserEntity> for CachedUser {
    fn from(user: UserEntity) -> Self {
        let UserEntity {
            user_id,
            user_name,
            password_digest: _,
            email,
            role,
            created_at,
            updated_at,
        } = user;

        Self {
            user_id,
            user_name,
            email,
            role,
            created_at,
            updated_at,
        }
    }
}

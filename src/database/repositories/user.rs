use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{NewUser, UserChanges, UserEntity};

const USER_COLUMNS: &str =
    "user_id, user_name, password_digest, email, role, created_at, updated_at";

/// 用户存储库实现
pub struct UserRepository;

impl UserRepository {
    /// 创建用户
    pub async fn create(pool: &PgPool, user: &NewUser) -> Result<UserEntity, sqlx::Error> {
        let sql = format!(
            r#"
            INSERT INTO users (user_id, user_name, password_digest, email, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );
        let user = sqlx::query_as::<_, UserEntity>(&sql)
            .bind(user.user_id)
            .bind(&user.user_name)
            .bind(&user.password_digest)
            .bind(&user.email)
            .bind(user.role)
            .fetch_one(pool)
            .await?;

        tracing::info!("Created user: {}", user.user_id);
        Ok(user)
    }

    /// 根据ID查找用户
    pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        sqlx::query_as::<_, UserEntity>(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// 根据邮箱查找用户
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, UserEntity>(&sql)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// 更新用户信息，返回更新后的行
    pub async fn update(
        pool: &PgPool,
        user_id: Uuid,
        changes: &UserChanges,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            UPDATE users
            SET user_name = COALESCE($2, user_name),
                email = COALESCE($3, email),
                password_digest = COALESCE($4, password_digest),
                role = COALESCE($5, role),
                updated_at = now()
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        );
        sqlx::query_as::<_, UserEntity>(&sql)
            .bind(user_id)
            .bind(changes.user_name.as_deref())
            .bind(changes.email.as_deref())
            .bind(changes.password_digest.as_deref())
            .bind(changes.role)
            .fetch_optional(pool)
            .await
    }

    /// 删除用户
    pub async fn delete(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

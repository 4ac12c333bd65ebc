use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{ProfileUpdate, Registration};
use crate::cache::CachedUser;
use crate::database::UserRole;
use crate::error::AppError;

const MAX_FIELD_LEN: usize = 255;
const MIN_PASSWORD_LEN: usize = 6;
// bcrypt 只使用前 72 字节
const MAX_PASSWORD_LEN: usize = 72;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 修改用户资料，`userId` 缺省时修改自己
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub user_id: Option<Uuid>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<Uuid>,
}

/// 登录/注册响应：用户信息加令牌
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub user: CachedUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserResponse {
    pub user_id: Uuid,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, AppError> {
        Ok(Registration {
            user_name: validate_user_name(&self.user_name)?,
            email: validate_email(&self.email)?,
            password: validate_password(self.password)?,
        })
    }
}

impl LoginRequest {
    pub fn validate(self) -> Result<(String, String), AppError> {
        let email = self.email.trim().to_string();
        if email.is_empty() || self.password.is_empty() {
            return Err(AppError::Validation("邮箱和密码不能为空".into()));
        }
        Ok((email, self.password))
    }
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<(Option<Uuid>, ProfileUpdate), AppError> {
        let update = ProfileUpdate {
            user_name: self.user_name.as_deref().map(validate_user_name).transpose()?,
            email: self.email.as_deref().map(validate_email).transpose()?,
            password: self.password.map(validate_password).transpose()?,
            role: self.role,
        };
        Ok((self.user_id, update))
    }
}

fn validate_user_name(raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_FIELD_LEN {
        return Err(AppError::Validation(format!(
            "用户名长度必须在1到{}个字符之间",
            MAX_FIELD_LEN
        )));
    }
    Ok(name.to_string())
}

fn validate_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !well_formed || email.len() > MAX_FIELD_LEN {
        return Err(AppError::Validation("邮箱格式无效".into()));
    }
    Ok(email.to_string())
}

fn validate_password(password: String) -> Result<String, AppError> {
    if password.len() < MIN_PASSWORD_LEN || password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "密码长度必须在{}到{}个字节之间",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        )));
    }
    Ok(password)
}

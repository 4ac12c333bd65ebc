use uuid::Uuid;

use crate::auth::resolver::IdentityResolver;
use crate::cache::CachedUser;
use crate::error::AppError;

pub const MISSING_TOKEN: &str = "请先登录";
pub const INVALID_SESSION: &str = "登录态非法";

/// 请求级鉴权
#[derive(Clone)]
pub struct AuthGuard {
    resolver: IdentityResolver,
}

impl AuthGuard {
    pub fn new(resolver: IdentityResolver) -> Self {
        Self { resolver }
    }

    /// 根据传输层提取出的令牌解析当前用户
    pub async fn authenticate(&self, token: Option<&str>) -> Result<CachedUser, AppError> {
        let token = match token.map(str::trim) {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AppError::Unauthenticated(MISSING_TOKEN)),
        };

        self.resolver
            .resolve_by_token(token)
            .await?
            .ok_or(AppError::Unauthenticated(INVALID_SESSION))
    }
}

/// 只有本人或超级管理员可以操作目标用户
pub fn authorize_self_or_admin(acting: &CachedUser, target_user_id: Uuid) -> Result<(), AppError> {
    if acting.user_id == target_user_id || acting.is_super_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

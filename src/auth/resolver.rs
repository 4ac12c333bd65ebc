use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{CachedUser, SessionCache};
use crate::database::{SessionStore, StoreError};
use crate::utils::token_prefix;

/// 身份解析：先查缓存，未命中再查存储并回填缓存
///
/// 存储错误原样返回，不会被当作“不存在”缓存下来。
#[derive(Clone)]
pub struct IdentityResolver {
    cache: Arc<SessionCache>,
    store: Arc<dyn SessionStore>,
}

impl IdentityResolver {
    pub fn new(cache: Arc<SessionCache>, store: Arc<dyn SessionStore>) -> Self {
        Self { cache, store }
    }

    pub async fn resolve_by_user_id(&self, user_id: Uuid) -> Result<Option<CachedUser>, StoreError> {
        if let Some(user) = self.cache.users.get_cached_user(&user_id) {
            return Ok(Some(user));
        }

        tracing::debug!("User cache miss: {}", user_id);
        let Some(entity) = self.store.find_user_by_id(user_id).await? else {
            return Ok(None);
        };

        let user = CachedUser::from(entity);
        if !self.cache.users.cache_user(user.clone()) {
            // 读取期间已有更新的资料写入缓存，以缓存为准
            if let Some(newer) = self.cache.users.get_cached_user(&user_id) {
                return Ok(Some(newer));
            }
        }
        Ok(Some(user))
    }

    pub async fn resolve_by_token(&self, token: &str) -> Result<Option<CachedUser>, StoreError> {
        if let Some(user_id) = self.cache.tokens.get_user_id(token) {
            let user = self.resolve_by_user_id(user_id).await?;
            if user.is_none() {
                // 用户已被删除，映射失效
                self.cache.tokens.remove_token(token);
            }
            return Ok(user);
        }

        tracing::debug!("Token cache miss: {}…", token_prefix(token));
        let Some(record) = self.store.find_token(token).await? else {
            return Ok(None);
        };
        let Some(user) = self.resolve_by_user_id(record.user_id).await? else {
            return Ok(None);
        };

        self.cache.tokens.cache_token(token, user.user_id);
        Ok(Some(user))
    }
}

// 缓存模块
// 进程内的两级会话缓存：token -> userId，userId -> CachedUser

pub mod bounded;
pub mod models;
pub mod operations;

pub use bounded::BoundedCache;
pub use models::CachedUser;
pub use operations::{TokenCache, UserCache};

use crate::config::CacheConfig;

/// 会话缓存
///
/// 令牌只映射到用户ID，同一用户的多个令牌共享一条用户缓存，
/// 内存占用与活跃用户数而不是会话数成正比。
pub struct SessionCache {
    pub users: UserCache,
    pub tokens: TokenCache,
}

impl SessionCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            users: UserCache::new(config.user_capacity, config.user_ttl),
            tokens: TokenCache::new(config.token_capacity, config.token_ttl),
        }
    }
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

use std::time::Duration;

use uuid::Uuid;

use crate::cache::bounded::BoundedCache;
use crate::cache::models::CachedUser;

/// 用户缓存操作：userId -> CachedUser
pub struct UserCache {
    entries: BoundedCache<Uuid, CachedUser>,
}

impl UserCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: BoundedCache::new(capacity, ttl),
        }
    }

    pub fn get_cached_user(&self, user_id: &Uuid) -> Option<CachedUser> {
        self.entries.get(user_id)
    }

    /// 缓存用户信息，键取自用户自身的ID
    ///
    /// 已缓存的条目 `updated_at` 更新时保留旧条目：
    /// 提交前读到的旧行不能覆盖修改后写入的新值。
    pub fn cache_user(&self, user: CachedUser) -> bool {
        self.entries
            .set_unless(user.user_id, user, |cached, fetched| {
                cached.updated_at > fetched.updated_at
            })
    }

    pub fn remove_user(&self, user_id: &Uuid) {
        self.entries.delete(user_id);
    }

    pub fn len(&self) -> u64 {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

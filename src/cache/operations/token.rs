use std::time::Duration;

use uuid::Uuid;

use crate::cache::bounded::BoundedCache;

/// 令牌缓存操作：token -> userId
pub struct TokenCache {
    entries: BoundedCache<String, Uuid>,
}

impl TokenCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            entries: BoundedCache::new(capacity, ttl),
        }
    }

    pub fn get_user_id(&self, token: &str) -> Option<Uuid> {
        self.entries.get(token)
    }

    pub fn cache_token(&self, token: &str, user_id: Uuid) {
        self.entries.set(token.to_string(), user_id);
    }

    pub fn remove_token(&self, token: &str) {
        self.entries.delete(token);
    }

    pub fn len(&self) -> u64 {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

use std::borrow::Borrow;
use std::hash::Hash;
use std::time::Duration;

use moka::ops::compute::{CompResult, Op};
use moka::policy::EvictionPolicy;
use moka::sync::Cache;

/// 容量有界、带过期时间的进程内缓存
///
/// 超出容量时淘汰最久未访问的条目；条目在写入后 `ttl` 过期，读取时惰性判定。
/// 内部同步，可在多个请求之间共享。
pub struct BoundedCache<K, V> {
    inner: Cache<K, V>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self { inner }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(key)
    }

    /// 写入并覆盖旧值，同时重置过期时间
    pub fn set(&self, key: K, value: V) {
        self.inner.insert(key, value);
        // 立即执行挂起的淘汰，保证容量上限在返回时已生效
        self.inner.run_pending_tasks();
    }

    /// 原子地写入新值，`keep_existing(旧值, 新值)` 为真时保留旧值
    ///
    /// 返回是否写入了新值。
    pub fn set_unless<F>(&self, key: K, value: V, keep_existing: F) -> bool
    where
        F: FnOnce(&V, &V) -> bool,
    {
        let result = self.inner.entry(key).and_compute_with(|current| {
            let keep = match &current {
                Some(entry) => keep_existing(entry.value(), &value),
                None => false,
            };
            if keep { Op::Nop } else { Op::Put(value) }
        });
        self.inner.run_pending_tasks();

        !matches!(result, CompResult::Unchanged(_))
    }

    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.invalidate(key);
    }

    pub fn capacity(&self) -> u64 {
        self.inner.policy().max_capacity().unwrap_or(u64::MAX)
    }

    /// 近似条目数
    pub fn len(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(capacity: u64) -> BoundedCache<String, u32> {
        BoundedCache::new(capacity, Duration::from_secs(60))
    }

    #[test]
    fn evicts_least_recently_used_entry() {
        let cache = cache(3);
        cache.set("a".into(), 1);
        cache.set("b".into(), 2);
        cache.set("c".into(), 3);

        // a 被访问过，b 成为最久未使用的条目
        assert_eq!(cache.get("a"), Some(1));
        cache.set("d".into(), 4);

        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
        assert_eq!(cache.get("d"), Some(4));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn set_replaces_existing_value() {
        let cache = cache(4);
        cache.set("user".into(), 1);
        cache.set("user".into(), 2);

        assert_eq!(cache.get("user"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn delete_removes_entry() {
        let cache = cache(4);
        cache.set("token".into(), 7);
        cache.delete("token");

        assert_eq!(cache.get("token"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn entries_expire_after_ttl() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(16, Duration::from_millis(50));
        cache.set("short".into(), 1);
        assert_eq!(cache.get("short"), Some(1));

        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(cache.get("short"), None);
    }

    #[test]
    fn set_resets_ttl() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(16, Duration::from_millis(200));
        cache.set("key".into(), 1);
        std::thread::sleep(Duration::from_millis(120));
        cache.set("key".into(), 2);
        std::thread::sleep(Duration::from_millis(120));

        assert_eq!(cache.get("key"), Some(2));
    }

    #[test]
    fn set_unless_keeps_existing_when_asked() {
        let cache = cache(4);
        assert!(cache.set_unless("v".into(), 2, |old, new| old > new));
        assert!(!cache.set_unless("v".into(), 1, |old, new| old > new));
        assert_eq!(cache.get("v"), Some(2));

        assert!(cache.set_unless("v".into(), 3, |old, new| old > new));
        assert_eq!(cache.get("v"), Some(3));
    }

    #[test]
    fn reports_configured_capacity() {
        assert_eq!(cache(32).capacity(), 32);
    }
}

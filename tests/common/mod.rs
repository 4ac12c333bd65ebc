// 测试公共工具：带调用计数与故障注入的内存存储
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use session_backend::auth::{AuthService, BcryptHasher};
use session_backend::cache::CachedUser;
use session_backend::config::Config;
use session_backend::database::{
    NewUser, SessionStore, StoreError, TokenEntity, UserChanges, UserEntity, UserRole,
};

/// 测试中使用最低的 bcrypt 代价
pub const TEST_BCRYPT_COST: u32 = 4;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserEntity>,
    tokens: HashMap<String, TokenEntity>,
}

#[derive(Default)]
pub struct Calls {
    pub find_user: AtomicUsize,
    pub find_token: AtomicUsize,
    pub select_stale: AtomicUsize,
    pub delete_tokens: AtomicUsize,
}

/// 内存版 SessionStore，语义与 Postgres 表结构一致：
/// 邮箱唯一，删除用户级联删除令牌，清理按 `created_at < cutoff` 严格比较。
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    // 读出用户行之后、返回之前的延迟（毫秒）
    user_read_delay_ms: AtomicU64,
    pub calls: Calls,
}

fn unavailable() -> StoreError {
    StoreError::Unavailable(sqlx::Error::PoolTimedOut)
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_user_read_delay(&self, delay: Duration) {
        self.user_read_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }

    pub fn seed_user(&self, user_name: &str, email: &str, role: UserRole) -> CachedUser {
        let now = Utc::now();
        let entity = UserEntity {
            user_id: Uuid::now_v7(),
            user_name: user_name.to_string(),
            password_digest: "$2b$04$not-a-real-digest".to_string(),
            email: email.to_string(),
            role,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().users.insert(entity.user_id, entity.clone());
        CachedUser::from(entity)
    }

    pub fn seed_token(&self, token: &str, user_id: Uuid, created_at: DateTime<Utc>) {
        self.tables.lock().tokens.insert(
            token.to_string(),
            TokenEntity {
                token: token.to_string(),
                user_id,
                created_at,
            },
        );
    }

    /// 绕过服务直接删除用户，模拟其他进程的修改
    pub fn delete_user_out_of_band(&self, user_id: Uuid) {
        let mut tables = self.tables.lock();
        tables.users.remove(&user_id);
        tables.tokens.retain(|_, t| t.user_id != user_id);
    }

    pub fn has_token(&self, token: &str) -> bool {
        self.tables.lock().tokens.contains_key(token)
    }

    pub fn tokens_of(&self, user_id: Uuid) -> usize {
        self.tables
            .lock()
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .count()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert_user(&self, user: NewUser) -> Result<UserEntity, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock();
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".into()));
        }

        let now = Utc::now();
        let entity = UserEntity {
            user_id: user.user_id,
            user_name: user.user_name,
            password_digest: user.password_digest,
            email: user.email,
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(entity.user_id, entity.clone());
        Ok(entity)
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<UserEntity>, StoreError> {
        self.calls.find_user.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let user = self.tables.lock().users.get(&user_id).cloned();

        let delay = self.user_read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserEntity>, StoreError> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserEntity>, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock();
        if let Some(email) = &changes.email {
            if tables
                .users
                .values()
                .any(|u| &u.email == email && u.user_id != user_id)
            {
                return Err(StoreError::Conflict("users_email_key".into()));
            }
        }

        let Some(user) = tables.users.get_mut(&user_id) else {
            return Ok(None);
        };
        if let Some(user_name) = changes.user_name {
            user.user_name = user_name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(digest) = changes.password_digest {
            user.password_digest = digest;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: Uuid) -> Result<bool, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock();
        let existed = tables.users.remove(&user_id).is_some();
        tables.tokens.retain(|_, t| t.user_id != user_id);
        Ok(existed)
    }

    async fn insert_token(&self, token: &str, user_id: Uuid) -> Result<TokenEntity, StoreError> {
        self.check()?;
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::Unavailable(sqlx::Error::RowNotFound));
        }
        if tables.tokens.contains_key(token) {
            return Err(StoreError::Conflict("tokens_pkey".into()));
        }

        let entity = TokenEntity {
            token: token.to_string(),
            user_id,
            created_at: Utc::now(),
        };
        tables.tokens.insert(token.to_string(), entity.clone());
        Ok(entity)
    }

    async fn find_token(&self, token: &str) -> Result<Option<TokenEntity>, StoreError> {
        self.calls.find_token.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.tables.lock().tokens.get(token).cloned())
    }

    async fn delete_token(&self, token: &str) -> Result<bool, StoreError> {
        self.check()?;
        Ok(self.tables.lock().tokens.remove(token).is_some())
    }

    async fn select_stale_tokens(
        &self,
        created_before: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<String>, StoreError> {
        self.calls.select_stale.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let tables = self.tables.lock();
        let mut stale: Vec<&TokenEntity> = tables
            .tokens
            .values()
            .filter(|t| t.created_at < created_before)
            .collect();
        stale.sort_by_key(|t| t.created_at);

        Ok(stale
            .into_iter()
            .take(limit as usize)
            .map(|t| t.token.clone())
            .collect())
    }

    async fn delete_tokens(&self, tokens: &[String]) -> Result<u64, StoreError> {
        self.calls.delete_tokens.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut tables = self.tables.lock();
        Ok(tokens
            .iter()
            .filter(|t| tables.tokens.remove(t.as_str()).is_some())
            .count() as u64)
    }
}

pub fn test_config() -> Config {
    Config {
        bcrypt_cost: TEST_BCRYPT_COST,
        ..Config::default()
    }
}

pub fn auth_service(store: &Arc<MemoryStore>) -> AuthService {
    auth_service_with(store, &test_config())
}

pub fn auth_service_with(store: &Arc<MemoryStore>, config: &Config) -> AuthService {
    AuthService::new(
        store.clone(),
        Arc::new(BcryptHasher::new(TEST_BCRYPT_COST)),
        config,
    )
}

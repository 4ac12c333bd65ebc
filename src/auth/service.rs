use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::auth::guard::{self, AuthGuard};
use crate::auth::password::CredentialHasher;
use crate::auth::reaper::StaleSessionReaper;
use crate::auth::resolver::IdentityResolver;
use crate::auth::token;
use crate::cache::{CachedUser, SessionCache};
use crate::config::Config;
use crate::database::{NewUser, SessionStore, UserChanges, UserRole};
use crate::error::AppError;
use crate::utils::token_prefix;

pub const BAD_CREDENTIALS: &str = "用户名或密码错误";

/// 注册信息（已通过输入校验）
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_name: String,
    pub email: String,
    pub password: String,
}

/// 资料修改，`None` 表示不修改
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<UserRole>,
}

/// 会话鉴权服务，路由层只通过它访问核心逻辑
pub struct AuthService {
    store: Arc<dyn SessionStore>,
    hasher: Arc<dyn CredentialHasher>,
    cache: Arc<SessionCache>,
    resolver: IdentityResolver,
    guard: AuthGuard,
    reaper: Arc<StaleSessionReaper>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        hasher: Arc<dyn CredentialHasher>,
        config: &Config,
    ) -> Self {
        let cache = Arc::new(SessionCache::new(&config.cache));
        let resolver = IdentityResolver::new(Arc::clone(&cache), Arc::clone(&store));
        let reaper = Arc::new(StaleSessionReaper::new(
            Arc::clone(&store),
            Arc::clone(&cache),
            config.reaper.clone(),
        ));

        Self {
            store,
            hasher,
            guard: AuthGuard::new(resolver.clone()),
            resolver,
            cache,
            reaper,
        }
    }

    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    pub fn reaper(&self) -> &Arc<StaleSessionReaper> {
        &self.reaper
    }

    /// 为用户签发新令牌：先写入存储，再写缓存
    pub async fn issue_session(&self, user: &CachedUser) -> Result<String, AppError> {
        let token = token::issue();
        self.store.insert_token(&token, user.user_id).await?;
        self.cache.tokens.cache_token(&token, user.user_id);
        self.cache.users.cache_user(user.clone());

        tracing::info!("Issued session {}… for user {}", token_prefix(&token), user.user_id);
        Ok(token)
    }

    pub async fn authenticate(&self, token: Option<&str>) -> Result<CachedUser, AppError> {
        self.guard.authenticate(token).await
    }

    pub fn authorize_self_or_admin(&self, acting: &CachedUser, target_user_id: Uuid) -> Result<(), AppError> {
        guard::authorize_self_or_admin(acting, target_user_id)
    }

    /// 用户记录在外部被修改后调用
    pub fn invalidate_cached_user(&self, user_id: Uuid) {
        self.cache.users.remove_user(&user_id);
    }

    pub fn trigger_reap(&self) -> Option<JoinHandle<()>> {
        self.reaper.trigger()
    }

    pub async fn register(&self, registration: Registration) -> Result<(CachedUser, String), AppError> {
        let password_digest = self.hash_password(registration.password).await?;
        let entity = self
            .store
            .insert_user(NewUser {
                user_id: Uuid::now_v7(),
                user_name: registration.user_name,
                password_digest,
                email: registration.email,
                role: UserRole::User,
            })
            .await?;

        let user = CachedUser::from(entity);
        let token = self.issue_session(&user).await?;
        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(CachedUser, String), AppError> {
        let Some(entity) = self.store.find_user_by_email(email).await? else {
            tracing::warn!("Login rejected: unknown email");
            return Err(AppError::Unauthenticated(BAD_CREDENTIALS));
        };

        let valid = self
            .verify_password(password.to_string(), entity.password_digest.clone())
            .await?;
        if !valid {
            tracing::warn!("Login rejected: wrong password for user {}", entity.user_id);
            return Err(AppError::Unauthenticated(BAD_CREDENTIALS));
        }

        let user = CachedUser::from(entity);
        let token = self.issue_session(&user).await?;
        self.trigger_reap();
        Ok((user, token))
    }

    /// 注销令牌，存储与缓存同时失效
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.store.delete_token(token).await?;
        self.cache.tokens.remove_token(token);
        Ok(())
    }

    pub async fn get_user(&self, acting: &CachedUser, target: Option<Uuid>) -> Result<CachedUser, AppError> {
        match target {
            None => Ok(acting.clone()),
            Some(user_id) if user_id == acting.user_id => Ok(acting.clone()),
            Some(user_id) => self
                .resolver
                .resolve_by_user_id(user_id)
                .await?
                .ok_or(AppError::NotFound),
        }
    }

    /// 修改用户资料
    ///
    /// 存储中的 UPDATE 是串行化点，缓存在提交之后才写入：
    /// 提交与写缓存之间的并发读取可能看到修改前的值，这一短暂窗口是允许的。
    /// 缓存按 `updated_at` 保留较新的行，提交前读到的旧行不会在之后覆盖新值。
    pub async fn update_user(
        &self,
        acting: &CachedUser,
        target: Option<Uuid>,
        update: ProfileUpdate,
    ) -> Result<CachedUser, AppError> {
        let target = target.unwrap_or(acting.user_id);
        self.authorize_self_or_admin(acting, target)?;
        if update.role.is_some() && !acting.is_super_admin() {
            return Err(AppError::Forbidden);
        }

        let password_digest = match update.password {
            Some(password) => Some(self.hash_password(password).await?),
            None => None,
        };
        let changes = UserChanges {
            user_name: update.user_name,
            email: update.email,
            password_digest,
            role: update.role,
        };

        let entity = self
            .store
            .update_user(target, changes)
            .await?
            .ok_or(AppError::NotFound)?;
        let user = CachedUser::from(entity);
        self.cache.users.cache_user(user.clone());
        Ok(user)
    }

    /// 删除用户，令牌由存储级联删除
    pub async fn delete_user(&self, acting: &CachedUser, target: Option<Uuid>) -> Result<(), AppError> {
        let target = target.unwrap_or(acting.user_id);
        self.authorize_self_or_admin(acting, target)?;

        if !self.store.delete_user(target).await? {
            return Err(AppError::NotFound);
        }
        self.invalidate_cached_user(target);
        tracing::info!("Deleted user {}", target);
        Ok(())
    }

    async fn hash_password(&self, password: String) -> Result<String, AppError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("hash task failed: {e}")))?
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
    }

    async fn verify_password(&self, password: String, digest: String) -> Result<bool, AppError> {
        let hasher = Arc::clone(&self.hasher);
        tokio::task::spawn_blocking(move || hasher.verify(&password, &digest))
            .await
            .map_err(|e| AppError::Internal(format!("verify task failed: {e}")))?
            .map_err(|e| AppError::Internal(format!("failed to verify password: {e}")))
    }
}

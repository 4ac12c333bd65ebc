//! 会话鉴权
//!
//! 登录/注册时签发不透明令牌，之后的每个请求通过两级缓存把令牌解析为用户，
//! 过期令牌由后台清理任务按批回收。

pub mod guard;
pub mod password;
pub mod reaper;
pub mod resolver;
pub mod service;
pub mod token;

pub use guard::{AuthGuard, authorize_self_or_admin};
pub use password::{BcryptHasher, CredentialHasher};
pub use reaper::StaleSessionReaper;
pub use resolver::IdentityResolver;
pub use service::{AuthService, ProfileUpdate, Registration};

// 数据库模块
// 包含数据库实体定义、存储库操作以及存储抽象

pub mod models;
pub mod repositories;
pub mod store;

pub use models::{NewUser, TokenEntity, UserChanges, UserEntity, UserRole};
pub use store::{PgSessionStore, SessionStore, StoreError};

// 缓存操作

pub mod token;
pub mod user;

pub use token::TokenCache;
pub use user::UserCache;

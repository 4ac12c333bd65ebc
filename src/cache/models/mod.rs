pub mod user;

pub use user::CachedUser;

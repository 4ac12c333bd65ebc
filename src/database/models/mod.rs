pub mod token;
pub mod user;

pub use token::TokenEntity;
pub use user::{NewUser, UserChanges, UserEntity, UserRole};

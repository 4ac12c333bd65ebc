mod auth;
mod error_handler;

pub use auth::{SessionToken, TOKEN_NAME, auth_middleware, extract_token};
pub use error_handler::log_errors;

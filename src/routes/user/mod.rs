mod handler;
mod model;

pub use handler::{delete_info, get_info, login, logout, register, update_info};
pub use model::{
    DeleteUserResponse, LoginRequest, RegisterRequest, SessionResponse, UpdateUserRequest,
    UserQuery,
};

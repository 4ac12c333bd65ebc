use axum::{
    Json,
    extract::{Extension, Query, State},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{
    AppState,
    cache::CachedUser,
    error::AppError,
    middleware::{SessionToken, TOKEN_NAME},
    utils::{ApiResponse, success_to_api_response},
};

use super::model::{
    DeleteUserResponse, LoginRequest, RegisterRequest, SessionResponse, UpdateUserRequest,
    UserQuery,
};

type ApiJson<T> = Json<ApiResponse<T>>;

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_NAME, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// 注册新用户并签发令牌
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> Result<(CookieJar, ApiJson<SessionResponse>), AppError> {
    let registration = req.validate()?;
    let (user, token) = state.auth.register(registration).await?;

    Ok((
        jar.add(session_cookie(token.clone())),
        success_to_api_response(SessionResponse { user, token }),
    ))
}

/// 邮箱密码登录，顺带触发过期令牌清理
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, ApiJson<SessionResponse>), AppError> {
    let (email, password) = req.validate()?;
    let (user, token) = state.auth.login(&email, &password).await?;

    Ok((
        jar.add(session_cookie(token.clone())),
        success_to_api_response(SessionResponse { user, token }),
    ))
}

#[axum::debug_handler]
pub async fn logout(
    Extension(SessionToken(token)): Extension<SessionToken>,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, ApiJson<()>), AppError> {
    state.auth.logout(&token).await?;

    Ok((
        // 令牌不一定来自 Cookie，总是下发过期的 Cookie
        jar.add(Cookie::build((TOKEN_NAME, "")).path("/").removal()),
        success_to_api_response(()),
    ))
}

/// 查询用户信息，不带 userId 时返回当前用户
#[axum::debug_handler]
pub async fn get_info(
    Extension(current): Extension<CachedUser>,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ApiJson<CachedUser>, AppError> {
    let user = state.auth.get_user(&current, query.user_id).await?;
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn update_info(
    Extension(current): Extension<CachedUser>,
    State(state): State<AppState>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<ApiJson<CachedUser>, AppError> {
    let (target, update) = req.validate()?;
    let user = state.auth.update_user(&current, target, update).await?;
    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn delete_info(
    Extension(current): Extension<CachedUser>,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<ApiJson<DeleteUserResponse>, AppError> {
    let user_id = query.user_id.unwrap_or(current.user_id);
    state.auth.delete_user(&current, Some(user_id)).await?;
    Ok(success_to_api_response(DeleteUserResponse { user_id }))
}

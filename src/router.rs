use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    routes,
};

// 公开路由
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(routes::health::ping))
        .route("/users/register", post(routes::user::register))
        .route("/users/login", post(routes::user::login))
}

// 需要认证的路由
fn protected_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/logout", post(routes::user::logout))
        .route(
            "/users/info",
            get(routes::user::get_info)
                .put(routes::user::update_info)
                .delete(routes::user::delete_info),
        )
        .layer(from_fn_with_state(state.clone(), auth_middleware))
}

// 创建主路由
pub fn create_router(state: AppState) -> Router {
    let api = public_routes().merge(protected_routes(&state));

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router.layer(from_fn(log_errors)).with_state(state)
}

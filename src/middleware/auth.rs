use axum::{
    extract::{Query, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{AppState, error::AppError};

pub const TOKEN_NAME: &str = "token";

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// 请求中携带的会话令牌
///
/// 优先级：查询参数 `token`，请求头 `token`，`Authorization: Bearer`，Cookie `token`。
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

pub fn extract_token(request: &Request, jar: &CookieJar) -> Option<String> {
    let from_query = Query::<TokenQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.token);

    non_blank(from_query)
        .or_else(|| non_blank(token_header(request.headers())))
        .or_else(|| non_blank(bearer_token(request.headers())))
        .or_else(|| non_blank(jar.get(TOKEN_NAME).map(|c| c.value().to_string())))
}

fn non_blank(token: Option<String>) -> Option<String> {
    token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn token_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_NAME)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// 鉴权中间件：解析当前用户并放入请求扩展
pub async fn auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token(&request, &jar);
    let user = state.auth.authenticate(token.as_deref()).await?;

    if let Some(token) = token {
        request.extensions_mut().insert(SessionToken(token));
    }
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::header;

    use super::*;

    fn request(uri: &str, headers: &[(&str, &str)]) -> (Request, CookieJar) {
        let mut builder = axum::http::Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).unwrap();
        let jar = CookieJar::from_headers(request.headers());
        (request, jar)
    }

    #[test]
    fn query_parameter_wins() {
        let (req, jar) = request(
            "/users/info?token=from-query",
            &[("token", "from-header"), (header::COOKIE.as_str(), "token=from-cookie")],
        );
        assert_eq!(extract_token(&req, &jar).as_deref(), Some("from-query"));
    }

    #[test]
    fn header_beats_cookie() {
        let (req, jar) = request(
            "/users/info",
            &[("token", "from-header"), (header::COOKIE.as_str(), "token=from-cookie")],
        );
        assert_eq!(extract_token(&req, &jar).as_deref(), Some("from-header"));
    }

    #[test]
    fn bearer_header_is_accepted() {
        let (req, jar) = request("/users/info", &[(header::AUTHORIZATION.as_str(), "Bearer abc123")]);
        assert_eq!(extract_token(&req, &jar).as_deref(), Some("abc123"));
    }

    #[test]
    fn cookie_is_last_resort() {
        let (req, jar) = request("/users/info", &[(header::COOKIE.as_str(), "token=from-cookie")]);
        assert_eq!(extract_token(&req, &jar).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn blank_query_parameter_falls_through() {
        let (req, jar) = request("/users/info?token=", &[("token", "from-header")]);
        assert_eq!(extract_token(&req, &jar).as_deref(), Some("from-header"));
    }

    #[test]
    fn blank_token_header_falls_through_to_bearer() {
        let (req, jar) = request(
            "/users/info",
            &[("token", " "), (header::AUTHORIZATION.as_str(), "Bearer abc")],
        );
        assert_eq!(extract_token(&req, &jar).as_deref(), Some("abc"));
    }

    #[test]
    fn blank_bearer_falls_through_to_cookie() {
        let (req, jar) = request(
            "/users/info",
            &[
                (header::AUTHORIZATION.as_str(), "Bearer   "),
                (header::COOKIE.as_str(), "token=from-cookie"),
            ],
        );
        assert_eq!(extract_token(&req, &jar).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn missing_token_is_none() {
        let (req, jar) = request("/users/info", &[]);
        assert_eq!(extract_token(&req, &jar), None);
    }
}

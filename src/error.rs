use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::database::StoreError;
use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(constraint) => AppError::Conflict(constraint),
            unavailable => AppError::StoreUnavailable(unavailable),
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给客户端的业务码与提示，不包含内部细节
    fn code_and_message(&self) -> (i32, String) {
        match self {
            AppError::Unauthenticated(reason) => (error_codes::AUTH_FAILED, (*reason).to_string()),
            AppError::Forbidden => (error_codes::PERMISSION_DENIED, "无权限".into()),
            AppError::Conflict(_) => (error_codes::USER_EXISTS, "该用户已存在".into()),
            AppError::NotFound => (error_codes::NOT_FOUND, "用户不存在".into()),
            AppError::Validation(msg) => (error_codes::VALIDATION_ERROR, msg.clone()),
            AppError::StoreUnavailable(_) => {
                (error_codes::STORE_UNAVAILABLE, "服务暂不可用，请稍后重试".into())
            }
            AppError::Internal(_) => (error_codes::INTERNAL_ERROR, "内部服务器错误".into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (code, msg) = self.code_and_message();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        (status, error_to_api_response::<()>(code, msg)).into_response()
    }
}

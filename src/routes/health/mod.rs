use axum::Json;
use serde::Serialize;

use crate::utils::{ApiResponse, success_to_api_response};

/// Ping响应
#[derive(Serialize)]
pub struct PingResponse {
    /// 服务状态
    pub status: String,
    /// 服务器时间
    pub timestamp: i64,
}

/// 健康检查接口
pub async fn ping() -> Json<ApiResponse<PingResponse>> {
    success_to_api_response(PingResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

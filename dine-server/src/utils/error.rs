//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! # 错误码规范
//!
//! | 错误码 | 分类 | 说明 |
//! |--------|------|------|
//! | E0002 | 校验错误 | 输入不合法 |
//! | E0003 | 业务错误 | 资源不存在 |
//! | E0005 | 业务错误 | 当前状态不允许该操作 |
//! | E0007 | 业务错误 | 会话绑定无效 (下单) |
//! | E9xxx | 系统错误 | 数据库/内部错误 |
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Table 5 not found"))
//!
//! // 返回成功响应
//! Ok(Json(table))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use crate::db::repository::RepoError;

/// API 统一响应结构 (错误通道)
///
/// ```json
/// {
///   "code": "E0003",
///   "message": "Table 5 not found"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
///
/// # 错误分类
///
/// | 分类 | 说明 |
/// |------|------|
/// | 业务逻辑错误 | 资源不存在、状态机拒绝、会话绑定无效、校验失败 |
/// | 系统错误 | 数据库错误、内部错误 |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Invalid state: {0}")]
    /// 当前状态不允许该操作 (409)；详情只进日志，客户端收到通用消息
    InvalidState(String),

    #[error("Invalid table or token")]
    /// 会话绑定无效 (400)。下单时桌台未知、未开台、令牌不匹配
    /// 统一返回同一错误，避免会话令牌被枚举探测
    InvalidSessionBinding,

    #[error("Validation failed: {0}")]
    /// 校验失败 (400)
    Validation(String),

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // State machine rejection (409) — the expected/actual detail
            // stays in the log, the client gets a generic message
            AppError::InvalidState(detail) => {
                warn!(target: "state_machine", detail = %detail, "Rejected state transition");
                (
                    StatusCode::CONFLICT,
                    "E0005",
                    "Operation not allowed in current state".to_string(),
                )
            }

            // Session binding (400) — deliberately undifferentiated
            AppError::InvalidSessionBinding => (
                StatusCode::BAD_REQUEST,
                "E0007",
                "Invalid table or token".to_string(),
            ),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9002",
                    "Database error".to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    /// 资源不存在
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// 状态机拒绝；`msg` 应包含 expected/actual 详情 (仅日志可见)
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// 校验失败
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// 数据库错误
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// 内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

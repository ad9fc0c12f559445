// ==========================================
// 吊索具智能柜管理系统 - 统一响应封装
// ==========================================
// 格式: {code, success, data, message}
// 业务校验失败同样以该结构返回 (success=false)，由 code 区分类别
// ==========================================

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};

/// 响应码
pub mod codes {
    pub const SUCCESS: i32 = 20000;
    pub const NOT_FOUND: i32 = 40000;
    pub const INTERNAL: i32 = 40003;
    pub const BAD_REQUEST: i32 = 40005;
    pub const ILLEGAL_TOKEN: i32 = 50008;
    pub const TOKEN_EXPIRED: i32 = 50014;
}

/// 统一响应结构
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: codes::SUCCESS,
            success: true,
            data: Some(data),
            message: String::new(),
        }
    }

    pub fn fail(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            success: false,
            data: None,
            message: message.into(),
        }
    }

    pub fn from_error(err: &ApiError) -> Self {
        if !err.is_user_facing() {
            tracing::error!("请求处理失败: {}", err);
        }
        Self::fail(error_code(err), err.to_string())
    }

    pub fn from_result(result: ApiResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::from_error(&err),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// 序列化为传输层报文
    pub fn to_json(&self) -> Result<String, ApiError> {
        serde_json::to_string(self)
            .map_err(|e| ApiError::InternalError(format!("响应序列化失败: {}", e)))
    }
}

/// 错误 → 响应码
pub fn error_code(err: &ApiError) -> i32 {
    match err {
        ApiError::NotFound(_) => codes::NOT_FOUND,
        ApiError::SessionExpired => codes::TOKEN_EXPIRED,
        ApiError::RequiredField(_)
        | ApiError::AlreadyExists(_)
        | ApiError::UpdateNotAllowed
        | ApiError::DeleteNotAllowed
        | ApiError::InvalidInput(_)
        | ApiError::BadQueryParams
        | ApiError::GridAlreadyInUse { .. }
        | ApiError::GridOutOfRange { .. }
        | ApiError::NothingToReturn { .. }
        | ApiError::CredentialMismatch
        | ApiError::PasswordMismatch
        | ApiError::UserNotEffective
        | ApiError::UserExpired
        | ApiError::UserStatusAbnormal
        | ApiError::BusinessRuleViolation(_) => codes::BAD_REQUEST,
        ApiError::DatabaseError(_)
        | ApiError::DatabaseConnectionError(_)
        | ApiError::StorageError(_)
        | ApiError::InternalError(_)
        | ApiError::Other(_) => codes::INTERNAL,
    }
}

/// 传输层状态码 → 响应码 (401 为非法令牌，其余均为内部错误)
pub fn code_for_http_status(status: u16) -> i32 {
    match status {
        401 => codes::ILLEGAL_TOKEN,
        _ => codes::INTERNAL,
    }
}

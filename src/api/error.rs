// ==========================================
// 吊索具智能柜管理系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 约定: 校验类错误直接作为提示消息返回给前端
//       认证失败不区分"用户名不存在"与"密码错误"
// ==========================================

use crate::domain::auth::UserCheckError;
use crate::repository::error::RepositoryError;
use crate::storage::StorageError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 参数校验错误
    // ==========================================
    /// 必填字段为空 (携带字段名)
    #[error("{0}不能为空")]
    RequiredField(String),

    /// 唯一键重复 (携带字段名)
    #[error("{0}已存在")]
    AlreadyExists(String),

    /// 根记录 (id=1) 不允许修改
    #[error("数据不允许修改")]
    UpdateNotAllowed,

    /// 根记录 (id=1) 不允许删除
    #[error("数据不允许删除")]
    DeleteNotAllowed,

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("查询参数错误")]
    BadQueryParams,

    // ==========================================
    // 箱格/借还错误
    // ==========================================
    #[error("箱格已使用: cabinet_id={cabinet_id}, grid_no={grid_no}")]
    GridAlreadyInUse { cabinet_id: i64, grid_no: i64 },

    #[error("箱格编号超出范围: grid_no={grid_no}, 有效范围 1..={grid_count}")]
    GridOutOfRange { grid_no: i64, grid_count: i64 },

    #[error("没有未归还的使用记录: res_id={res_id}")]
    NothingToReturn { res_id: i64 },

    // ==========================================
    // 认证错误
    // ==========================================
    #[error("用户名或密码错误")]
    CredentialMismatch,

    #[error("密码错误")]
    PasswordMismatch,

    #[error("用户还未生效")]
    UserNotEffective,

    #[error("用户已失效")]
    UserExpired,

    #[error("用户状态异常")]
    UserStatusAbnormal,

    #[error("登录已过期")]
    SessionExpired,

    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("未找到数据表或相关记录: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("文件存储失败: {0}")]
    StorageError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn required(field: &str) -> Self {
        ApiError::RequiredField(field.to_string())
    }

    pub fn exists(field: &str) -> Self {
        ApiError::AlreadyExists(field.to_string())
    }

    pub fn not_found(entity: &str, id: i64) -> Self {
        ApiError::NotFound(format!("{}(id={})", entity, id))
    }

    /// 是否属于前端可直接展示的校验/业务类错误
    pub fn is_user_facing(&self) -> bool {
        !matches!(
            self,
            ApiError::DatabaseError(_)
                | ApiError::DatabaseConnectionError(_)
                | ApiError::StorageError(_)
                | ApiError::InternalError(_)
                | ApiError::Other(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            // 数据库错误
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }

            // 业务规则错误
            RepositoryError::GridOccupied {
                cabinet_id,
                grid_no,
                ..
            } => ApiError::GridAlreadyInUse {
                cabinet_id,
                grid_no,
            },
            RepositoryError::NoOpenUseLog { res_id } => ApiError::NothingToReturn { res_id },

            // 通用错误
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<UserCheckError> for ApiError {
    fn from(err: UserCheckError) -> Self {
        match err {
            UserCheckError::AbnormalStatus => ApiError::UserStatusAbnormal,
            UserCheckError::NotYetEffective => ApiError::UserNotEffective,
            UserCheckError::Expired => ApiError::UserExpired,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::EmptyContent | StorageError::InvalidName(_) => {
                ApiError::InvalidInput(err.to_string())
            }
            StorageError::Io(e) => ApiError::StorageError(e.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

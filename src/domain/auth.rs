// ==========================================
// 吊索具智能柜管理系统 - 用户与权限领域模型
// ==========================================
// 实体: 用户 / 角色 / 角色权限 / 用户角色关系
// 规则: 用户有效期窗口 + 状态检查 (登录、续期前执行)
// ==========================================

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::domain::types::UserStatus;

/// 新用户/重置密码时使用的默认口令
pub const DEFAULT_PASSWORD_SEED: &str = "123456a?";

/// 会话有效期上限（分钟，7 天）
pub const MAX_SESSION_TTL_MINUTES: i64 = 7 * 24 * 60;

// ==========================================
// User - 用户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub start_time: Option<NaiveDateTime>, // 生效时间
    pub end_time: Option<NaiveDateTime>,   // 失效时间
    pub status: UserStatus,
    pub remark: String,
    pub staff_id: i64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,

    // ===== 关联字段 (查询时填充) =====
    pub staff_name: Option<String>,
}

/// 用户有效性检查失败原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCheckError {
    #[error("用户状态异常")]
    AbnormalStatus,

    #[error("用户还未生效")]
    NotYetEffective,

    #[error("用户已失效")]
    Expired,
}

impl User {
    /// 创建待新增的用户 (密码在新增时由默认口令生成)
    pub fn new(name: impl Into<String>, staff_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            password: String::new(),
            start_time: None,
            end_time: None,
            status: UserStatus::Normal,
            remark: String::new(),
            staff_id,
            created_at: None,
            updated_at: None,
            staff_name: None,
        }
    }

    /// 检查账号在 `now` 时刻是否可用
    ///
    /// 顺序: 状态 → 生效时间 → 失效时间
    pub fn check(&self, now: NaiveDateTime) -> Result<(), UserCheckError> {
        if self.status != UserStatus::Normal {
            return Err(UserCheckError::AbnormalStatus);
        }
        if let Some(start) = self.start_time {
            if start > now {
                return Err(UserCheckError::NotYetEffective);
            }
        }
        if let Some(end) = self.end_time {
            if end < now {
                return Err(UserCheckError::Expired);
            }
        }
        Ok(())
    }

    /// 校验明文口令 (客户端提交值) 是否与存储摘要一致
    pub fn verify_password(&self, password: &str) -> bool {
        hash_password(password, &self.name) == self.password
    }
}

/// 口令摘要: hex(sha256(password + name))
pub fn hash_password(password: &str, name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(name.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 默认口令的存储摘要
///
/// 客户端提交的是一次摘要后的值，存储值再以用户名加盐摘要一次。
pub fn default_password_hash(name: &str) -> String {
    let client_side = hash_password(DEFAULT_PASSWORD_SEED, name);
    hash_password(&client_side, name)
}

// ==========================================
// UserInfo - 当前用户信息
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub roles: Vec<String>,
    pub introduction: String,
    pub avatar: String,
    pub staff_name: Option<String>,
}

/// 默认头像
pub const DEFAULT_AVATAR: &str = "./assets/user.gif";

// ==========================================
// SessionClaims - 会话声明
// ==========================================
// 签名与校验由外部令牌组件负责，这里只产出声明内容
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub user_id: i64,
    pub name: String,
    pub expires_at: NaiveDateTime,
}

impl SessionClaims {
    /// 签发会话声明，有效期限制在 0..=MAX_SESSION_TTL_MINUTES
    pub fn issue(user: &User, now: NaiveDateTime, ttl_minutes: i64) -> Self {
        let ttl = Duration::minutes(ttl_minutes.clamp(0, MAX_SESSION_TTL_MINUTES));
        Self {
            user_id: user.id,
            name: user.name.clone(),
            expires_at: now.checked_add_signed(ttl).unwrap_or(NaiveDateTime::MAX),
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires_at <= now
    }
}

// ==========================================
// Role - 角色
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub status: i16, // 0-正常，1-锁定，2-删除
    pub remark: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            status: 0,
            remark: String::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// 角色权限 (权限串由前端约定格式)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFunc {
    pub id: i64,
    pub role_id: i64,
    pub funcs: String,
}

/// 用户角色关系
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleRelation {
    pub id: i64,
    pub user_id: i64,
    pub role_id: i64,
}

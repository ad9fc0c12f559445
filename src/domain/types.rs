// ==========================================
// 吊索具智能柜管理系统 - 领域类型定义
// ==========================================
// 职责: 状态枚举、借还标记、根记录常量
// 存储: 数据库中统一以整数存储 (与旧系统数据保持兼容)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 受保护的根记录ID (用户/角色/员工)
///
/// 根记录不允许修改或删除，由校验层拦截而非数据库约束。
pub const ROOT_ROW_ID: i64 = 1;

/// 判断是否为根记录
pub fn is_root_row(id: i64) -> bool {
    id == ROOT_ROW_ID
}

// ==========================================
// 用户状态 (User Status)
// ==========================================
// 0-正常，1-锁定，2-删除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Normal,
    Locked,
    Deleted,
}

impl UserStatus {
    pub fn to_db_value(self) -> i16 {
        match self {
            UserStatus::Normal => 0,
            UserStatus::Locked => 1,
            UserStatus::Deleted => 2,
        }
    }

    /// 未知取值按锁定处理，避免异常数据被当作正常账号
    pub fn from_db_value(value: i16) -> Self {
        match value {
            0 => UserStatus::Normal,
            2 => UserStatus::Deleted,
            _ => UserStatus::Locked,
        }
    }
}

impl Default for UserStatus {
    fn default() -> Self {
        UserStatus::Normal
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStatus::Normal => write!(f, "NORMAL"),
            UserStatus::Locked => write!(f, "LOCKED"),
            UserStatus::Deleted => write!(f, "DELETED"),
        }
    }
}

// ==========================================
// 吊索具使用状态 (Use Status)
// ==========================================
// 1-在库，2-借出 (0 表示尚未入柜登记)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UseStatus {
    Unregistered,
    InStock,
    InUse,
}

impl UseStatus {
    pub fn to_db_value(self) -> i64 {
        match self {
            UseStatus::Unregistered => 0,
            UseStatus::InStock => 1,
            UseStatus::InUse => 2,
        }
    }

    pub fn from_db_value(value: i64) -> Self {
        match value {
            1 => UseStatus::InStock,
            2 => UseStatus::InUse,
            _ => UseStatus::Unregistered,
        }
    }
}

impl fmt::Display for UseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UseStatus::Unregistered => write!(f, "UNREGISTERED"),
            UseStatus::InStock => write!(f, "IN_STOCK"),
            UseStatus::InUse => write!(f, "IN_USE"),
        }
    }
}

// ==========================================
// 借还标记 (Take / Return Flag)
// ==========================================
// 0-归还，1-借出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TakeReturnFlag {
    Return,
    Take,
}

impl TakeReturnFlag {
    /// 从请求中的整数标记解析，非 0/1 返回 None
    pub fn from_flag(flag: i64) -> Option<Self> {
        match flag {
            0 => Some(TakeReturnFlag::Return),
            1 => Some(TakeReturnFlag::Take),
            _ => None,
        }
    }

    /// 箱格 is_out 字段取值
    pub fn out_flag(self) -> i64 {
        match self {
            TakeReturnFlag::Return => 0,
            TakeReturnFlag::Take => 1,
        }
    }

    /// 借还后吊索具应处的使用状态
    pub fn resulting_use_status(self) -> UseStatus {
        match self {
            TakeReturnFlag::Return => UseStatus::InStock,
            TakeReturnFlag::Take => UseStatus::InUse,
        }
    }
}

impl fmt::Display for TakeReturnFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TakeReturnFlag::Return => write!(f, "RETURN"),
            TakeReturnFlag::Take => write!(f, "TAKE"),
        }
    }
}

// ==========================================
// 归还状态过滤 (使用日志查询)
// ==========================================
// 1-已归还，2-未归还，其余不过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnFilter {
    All,
    Returned,
    Outstanding,
}

impl ReturnFilter {
    pub fn from_flag(flag: i64) -> Self {
        match flag {
            1 => ReturnFilter::Returned,
            2 => ReturnFilter::Outstanding,
            _ => ReturnFilter::All,
        }
    }
}

impl Default for ReturnFilter {
    fn default() -> Self {
        ReturnFilter::All
    }
}

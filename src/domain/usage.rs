// ==========================================
// 吊索具智能柜管理系统 - 借还记录领域模型
// ==========================================
// 一条记录对应一次 借出→归还 周期
// 未归还记录: return_time 为空；同一资产取最新一条
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ReturnFilter, TakeReturnFlag};

// ==========================================
// UseLog - 使用日志
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseLog {
    pub id: i64,
    pub res_id: i64,
    pub rf_id: String,
    pub res_name: String,
    pub take_staff_id: i64,
    pub take_staff_name: String,
    pub take_time: Option<NaiveDateTime>,
    pub return_plan_time: Option<NaiveDateTime>,
    pub return_staff_id: i64,
    pub return_staff_name: String,
    pub return_time: Option<NaiveDateTime>,
    pub remark: String,
    pub created_at: Option<NaiveDateTime>,
}

impl UseLog {
    pub fn is_open(&self) -> bool {
        self.return_time.is_none()
    }
}

// ==========================================
// TakeReturnRequest - 按资产借还请求
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TakeReturnRequest {
    pub res_id: i64,
    pub flag: TakeReturnFlag,
    /// 借出人/归还人
    pub staff_id: i64,
    pub staff_name: String,
    /// 借出: 借出时间；归还: 归还时间 (缺省为当前时间)
    pub event_time: Option<NaiveDateTime>,
    /// 借出时填写
    pub return_plan_time: Option<NaiveDateTime>,
    pub remark: String,
}

impl TakeReturnRequest {
    pub fn take(res_id: i64, staff_id: i64) -> Self {
        Self::with_flag(res_id, TakeReturnFlag::Take, staff_id)
    }

    pub fn give_back(res_id: i64, staff_id: i64) -> Self {
        Self::with_flag(res_id, TakeReturnFlag::Return, staff_id)
    }

    fn with_flag(res_id: i64, flag: TakeReturnFlag, staff_id: i64) -> Self {
        Self {
            res_id,
            flag,
            staff_id,
            staff_name: String::new(),
            event_time: None,
            return_plan_time: None,
            remark: String::new(),
        }
    }
}

/// 借还执行结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakeReturnOutcome {
    pub res_id: i64,
    pub flag: TakeReturnFlag,
    /// 新增或被更新的日志ID
    pub log_id: i64,
    /// 资产是否有箱格 (无箱格时箱格标记更新为空操作)
    pub grid_updated: bool,
}

/// 使用日志查询条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UseLogQuery {
    pub res_name: Option<String>,
    pub return_filter: ReturnFilter,
    pub take_staff_id: Option<i64>,
    pub return_staff_id: Option<i64>,
    pub take_start_time: Option<NaiveDateTime>,
    pub take_end_time: Option<NaiveDateTime>,
}

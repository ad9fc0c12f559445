// ==========================================
// 吊索具智能柜管理系统 - 组织机构领域模型
// ==========================================
// 实体: 公司 / 部门 / 员工
// 删除: 公司、部门为物理删除；员工为软删除
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Company - 公司
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub status: i16, // 0-正常，1-停用
    pub remark: String,
}

// ==========================================
// Department - 部门
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub status: i16,
    pub remark: String,

    // ===== 关联字段 (查询时填充) =====
    pub company: Option<Company>,
}

// ==========================================
// Staff - 员工
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub name: String,
    pub company_id: i64,
    pub department_id: i64,
    pub post_name: String,               // 职务
    pub birthday: Option<NaiveDateTime>, // 出生日期
    pub status: i16,
    pub remark: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,

    // ===== 关联字段 (查询时填充) =====
    pub company_name: Option<String>,
    pub department_name: Option<String>,
}

impl Staff {
    /// 创建待新增的员工 (id 由数据库分配)
    pub fn new(name: impl Into<String>, company_id: i64, department_id: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            company_id,
            department_id,
            post_name: String::new(),
            birthday: None,
            status: 0,
            remark: String::new(),
            created_at: None,
            updated_at: None,
            company_name: None,
            department_name: None,
        }
    }
}

/// 部门查询条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepartmentQuery {
    pub name: Option<String>,
    pub company_id: Option<i64>,
}

/// 员工查询条件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffQuery {
    pub name: Option<String>,
    pub company_id: Option<i64>,
    pub department_id: Option<i64>,
}

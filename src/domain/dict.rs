// ==========================================
// 吊索具智能柜管理系统 - 字典与统计模型
// ==========================================

use serde::{Deserialize, Serialize};

/// 字典数据 (前端枚举项)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictData {
    pub id: i64,
    pub key: i64,
    pub name: String,
    pub dict_type: String,
    pub note: String,
    pub scene: String, // 应用场景
}

/// 首页资源总览
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOverview {
    pub sling_count: i64,
    pub cabinet_count: i64,
    pub grid_total: i64,
    pub grid_used: i64,
    pub staff_count: i64,
    pub user_count: i64,
    pub outstanding_count: i64,
}

/// 分组计数 (按吨位/按状态)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: i64,
    pub count: i64,
}

/// 吊索具使用次数排行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlingUsageRank {
    pub res_id: i64,
    pub name: String,
    pub use_count: i64,
}

// ==========================================
// 吊索具智能柜管理系统 - 资产与智能柜领域模型
// ==========================================
// 实体: 吊索具 / 智能柜 / 箱格
// 规则: 箱格编号在 1..=grid_count 内连续；未落库的箱格视为空格
//       同一资产 (非 0) 同时最多占用一个箱格
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::UseStatus;

/// 空箱格的资产ID
pub const EMPTY_RESOURCE_ID: i64 = 0;

/// 单个智能柜的箱格数上限
pub const MAX_GRID_COUNT: i64 = 1024;

// ==========================================
// Sling - 吊索具
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sling {
    pub id: i64,
    pub rf_id: String, // RFID 标签
    pub name: String,
    pub sling_type: i64,
    pub max_tonnage: i64,
    pub use_status: UseStatus,
    pub inspect_status: i64,
    pub put_time: String,
    pub use_permission: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,

    // ===== 派生字段 (列表查询时填充) =====
    pub use_count: i64,
    pub location: Option<SlingLocation>,
}

impl Sling {
    pub fn new(rf_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            rf_id: rf_id.into(),
            name: name.into(),
            sling_type: 0,
            max_tonnage: 0,
            use_status: UseStatus::Unregistered,
            inspect_status: 0,
            put_time: String::new(),
            use_permission: String::new(),
            created_at: None,
            updated_at: None,
            use_count: 0,
            location: None,
        }
    }
}

/// 吊索具所在位置 (由箱格关联得出，不单独存储)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlingLocation {
    pub cabinet_id: i64,
    pub cabinet_name: String,
    pub grid_no: i64,
    pub is_out: bool,
}

/// 吊索具查询条件 (0/空 表示不过滤)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlingQuery {
    pub name: Option<String>,
    pub sling_type: Option<i64>,
    pub max_tonnage: Option<i64>,
    pub use_status: Option<i64>,
    pub inspect_status: Option<i64>,
}

// ==========================================
// Cabinet - 智能柜
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cabinet {
    pub id: i64,
    pub name: String,
    pub grid_count: i64,
    pub location: String,
    pub status: i16, // 0-正常
    pub remark: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,

    // ===== 派生字段 (列表查询时填充) =====
    pub used_count: i64,
    pub unused_count: i64,
}

impl Cabinet {
    pub fn new(name: impl Into<String>, grid_count: i64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            grid_count,
            location: String::new(),
            status: 0,
            remark: String::new(),
            created_at: None,
            updated_at: None,
            used_count: 0,
            unused_count: grid_count,
        }
    }

    pub fn contains_grid(&self, grid_no: i64) -> bool {
        grid_no >= 1 && grid_no <= self.grid_count
    }
}

// ==========================================
// CabinetGrid - 箱格 (落库行)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinetGrid {
    pub id: i64,
    pub grid_no: i64,
    pub cabinet_id: i64,
    pub in_res_id: i64, // 存放的资产ID，空为 0
    pub is_out: bool,   // 是否借出
}

// ==========================================
// GridSlot - 箱格视图 (稠密 1..=N)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSlot {
    pub grid_no: i64,
    pub cabinet_id: i64,
    pub in_res_id: i64,
    pub is_out: bool,
    /// 对应的落库行ID，虚拟空格为 None
    pub grid_id: Option<i64>,
}

impl GridSlot {
    pub fn is_empty(&self) -> bool {
        self.in_res_id == EMPTY_RESOURCE_ID
    }
}

/// 将稀疏存储的箱格行展开为 1..=grid_count 的稠密视图
///
/// 超出范围的行被忽略；同一编号存在多行时取第一行。
/// 箱格数按 `MAX_GRID_COUNT` 截断。
pub fn dense_grid_view(cabinet_id: i64, grid_count: i64, rows: &[CabinetGrid]) -> Vec<GridSlot> {
    (1..=grid_count.clamp(0, MAX_GRID_COUNT))
        .map(|grid_no| match rows.iter().find(|g| g.grid_no == grid_no) {
            Some(row) => GridSlot {
                grid_no,
                cabinet_id,
                in_res_id: row.in_res_id,
                is_out: row.is_out,
                grid_id: Some(row.id),
            },
            None => GridSlot {
                grid_no,
                cabinet_id,
                in_res_id: EMPTY_RESOURCE_ID,
                is_out: false,
                grid_id: None,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(id: i64, grid_no: i64, in_res_id: i64) -> CabinetGrid {
        CabinetGrid {
            id,
            grid_no,
            cabinet_id: 5,
            in_res_id,
            is_out: false,
        }
    }

    #[test]
    fn test_dense_view_without_rows() {
        let view = dense_grid_view(5, 3, &[]);
        assert_eq!(view.len(), 3);
        assert_eq!(
            view.iter().map(|s| s.grid_no).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(view.iter().all(|s| s.is_empty() && s.grid_id.is_none()));
    }

    #[test]
    fn test_dense_view_sparse_rows() {
        let rows = vec![grid(10, 2, 77), grid(11, 9, 88)];
        let view = dense_grid_view(5, 3, &rows);
        assert_eq!(view.len(), 3);
        assert_eq!(view[0].in_res_id, 0);
        assert_eq!(view[1].in_res_id, 77);
        assert_eq!(view[1].grid_id, Some(10));
        assert_eq!(view[2].in_res_id, 0);
    }

    #[test]
    fn test_dense_view_all_rows() {
        let rows: Vec<_> = (1..=4).map(|n| grid(n, n, 100 + n)).collect();
        let view = dense_grid_view(5, 4, &rows);
        assert!(view.iter().all(|s| s.in_res_id == 100 + s.grid_no));
    }

    #[test]
    fn test_dense_view_caps_grid_count() {
        let view = dense_grid_view(5, 1 << 40, &[grid(1, 2, 7)]);
        assert_eq!(view.len() as i64, MAX_GRID_COUNT);
        assert_eq!(view[1].in_res_id, 7);
        assert!(dense_grid_view(5, -3, &[]).is_empty());
    }

    #[test]
    fn test_contains_grid() {
        let cabinet = Cabinet::new("A", 12);
        assert!(cabinet.contains_grid(1));
        assert!(cabinet.contains_grid(12));
        assert!(!cabinet.contains_grid(0));
        assert!(!cabinet.contains_grid(13));
    }
}

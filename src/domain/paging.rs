// ==========================================
// 吊索具智能柜管理系统 - 分页值对象
// ==========================================
// 规则: 页码默认 1，页大小默认 10 (未设置或 ≤0 时)
//       总页数 = ceil(总行数 / 页大小)
// ==========================================

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_INDEX: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 分页请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page_index: i64,
    pub page_size: i64,
}

impl PageQuery {
    pub fn new(page_index: i64, page_size: i64) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// 归一化后的分页参数
    pub fn normalized(self) -> Self {
        self.normalized_with(DEFAULT_PAGE_SIZE)
    }

    /// 以指定的默认页大小归一化
    pub fn normalized_with(self, default_page_size: i64) -> Self {
        let default_page_size = if default_page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            default_page_size
        };
        Self {
            page_index: if self.page_index <= 0 {
                DEFAULT_PAGE_INDEX
            } else {
                self.page_index
            },
            page_size: if self.page_size <= 0 {
                default_page_size
            } else {
                self.page_size
            },
        }
    }

    /// 当前页偏移量 (调用前需归一化)，超出范围时取上限
    pub fn offset(&self) -> i64 {
        self.page_index
            .saturating_sub(1)
            .max(0)
            .saturating_mul(self.page_size.max(0))
    }
}

/// 分页结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub total: i64,
    pub page_index: i64,
    pub page_size: i64,
    pub page_count: i64,
    pub list: Vec<T>,
}

impl<T> PageResult<T> {
    pub fn new(page: PageQuery, total: i64, list: Vec<T>) -> Self {
        Self {
            total,
            page_index: page.page_index,
            page_size: page.page_size,
            page_count: page_count(total, page.page_size),
            list,
        }
    }

    /// 不分页的完整列表 (页码/页大小/页数均为 0)
    pub fn unpaged(list: Vec<T>) -> Self {
        Self {
            total: list.len() as i64,
            page_index: 0,
            page_size: 0,
            page_count: 0,
            list,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PageResult<U> {
        PageResult {
            total: self.total,
            page_index: self.page_index,
            page_size: self.page_size,
            page_count: self.page_count,
            list: self.list.into_iter().map(f).collect(),
        }
    }
}

/// 计算总页数
pub fn page_count(total: i64, page_size: i64) -> i64 {
    if page_size <= 0 || total <= 0 {
        return 0;
    }
    total / page_size + i64::from(total % page_size != 0)
}

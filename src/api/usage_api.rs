// ==========================================
// 吊索具智能柜管理系统 - 存放与借还 API
// ==========================================
// 职责: 资产入柜、按箱格/按资产借还、使用日志查询
// 红线: 存放与借还的多表变更均在仓储事务内完成
// 归还时没有未归还日志: 返回 NothingToReturn，状态不变
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::require_id;
use crate::domain::paging::{PageQuery, PageResult, DEFAULT_PAGE_SIZE};
use crate::domain::resource::CabinetGrid;
use crate::domain::types::TakeReturnFlag;
use crate::domain::usage::{TakeReturnOutcome, TakeReturnRequest, UseLog, UseLogQuery};
use crate::repository::cabinet_repo::CabinetRepository;
use crate::repository::sling_repo::SlingRepository;
use crate::repository::use_log_repo::UseLogRepository;

/// 存放与借还API
pub struct UsageApi {
    cabinet_repo: Arc<CabinetRepository>,
    sling_repo: Arc<SlingRepository>,
    use_log_repo: Arc<UseLogRepository>,
    default_page_size: i64,
}

impl UsageApi {
    pub fn new(
        cabinet_repo: Arc<CabinetRepository>,
        sling_repo: Arc<SlingRepository>,
        use_log_repo: Arc<UseLogRepository>,
    ) -> Self {
        Self {
            cabinet_repo,
            sling_repo,
            use_log_repo,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size;
        self
    }

    // ==========================================
    // 存放
    // ==========================================

    /// 将资产存放到 (智能柜, 箱格)
    ///
    /// # 错误
    /// - `GridOutOfRange`: 编号不在 1..=grid_count
    /// - `GridAlreadyInUse`: 目标箱格已存放其他资产
    pub fn store(&self, cabinet_id: i64, grid_no: i64, res_id: i64) -> ApiResult<CabinetGrid> {
        require_id(cabinet_id)?;
        require_id(res_id)?;

        let cabinet = self
            .cabinet_repo
            .find_by_id(cabinet_id)?
            .ok_or_else(|| ApiError::not_found("Cabinet", cabinet_id))?;
        if !cabinet.contains_grid(grid_no) {
            return Err(ApiError::GridOutOfRange {
                grid_no,
                grid_count: cabinet.grid_count,
            });
        }
        if self.sling_repo.find_by_id(res_id)?.is_none() {
            return Err(ApiError::not_found("Sling", res_id));
        }

        let grid = self.cabinet_repo.store(cabinet_id, grid_no, res_id)?;
        tracing::info!(
            "资产入柜: res_id={}, cabinet_id={}, grid_no={}",
            res_id,
            cabinet_id,
            grid_no
        );
        Ok(grid)
    }

    // ==========================================
    // 借还
    // ==========================================

    /// 按箱格设置借出标记 (flag: 0-归还，1-借出)
    pub fn take_return(&self, cabinet_id: i64, grid_no: i64, flag: i64) -> ApiResult<()> {
        require_id(cabinet_id)?;
        let flag = TakeReturnFlag::from_flag(flag).ok_or(ApiError::BadQueryParams)?;

        let affected = self.cabinet_repo.set_slot_out_flag(cabinet_id, grid_no, flag)?;
        if affected == 0 {
            return Err(ApiError::NotFound(format!(
                "CabinetGrid(cabinet_id={}, grid_no={})",
                cabinet_id, grid_no
            )));
        }
        tracing::info!(
            "箱格借还: cabinet_id={}, grid_no={}, flag={}",
            cabinet_id,
            grid_no,
            flag
        );
        Ok(())
    }

    /// 按资产借还: 箱格标记、资产状态、使用日志三者同一事务
    pub fn take_return_by_resource(&self, req: TakeReturnRequest) -> ApiResult<TakeReturnOutcome> {
        require_id(req.res_id)?;
        if req.staff_id < 0 {
            return Err(ApiError::BadQueryParams);
        }
        match self.use_log_repo.take_return_by_resource(&req) {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                tracing::warn!("借还失败: res_id={}, flag={}, error={}", req.res_id, req.flag, e);
                Err(e.into())
            }
        }
    }

    // ==========================================
    // 使用日志
    // ==========================================

    pub fn list_use_logs(&self, filter: &UseLogQuery, page: PageQuery) -> ApiResult<PageResult<UseLog>> {
        if let (Some(start), Some(end)) = (filter.take_start_time, filter.take_end_time) {
            if start > end {
                return Err(ApiError::BadQueryParams);
            }
        }
        let page = page.normalized_with(self.default_page_size);
        Ok(self.use_log_repo.list_paged(filter, page)?)
    }

    pub fn get_use_log(&self, id: i64) -> ApiResult<UseLog> {
        require_id(id)?;
        self.use_log_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("UseLog", id))
    }

    /// 资产当前未归还的日志
    pub fn open_use_log(&self, res_id: i64) -> ApiResult<Option<UseLog>> {
        require_id(res_id)?;
        Ok(self.use_log_repo.find_open_by_resource(res_id)?)
    }
}

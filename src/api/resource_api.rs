// ==========================================
// 吊索具智能柜管理系统 - 资产 API (吊索具 / 智能柜)
// ==========================================
// 职责: 吊索具与智能柜的维护、查询、箱格稠密视图
// 红线: 吊索具名称与 RFID 均不可与其他吊索具重复
// 红线: 智能柜箱格数必须大于 0，且不能缩小到已占用箱格之下
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{ensure_affected, require_id, require_non_empty};
use crate::domain::paging::{PageQuery, PageResult, DEFAULT_PAGE_SIZE};
use crate::domain::resource::{Cabinet, GridSlot, Sling, SlingQuery, MAX_GRID_COUNT};
use crate::repository::cabinet_repo::CabinetRepository;
use crate::repository::sling_repo::SlingRepository;

/// 资产API
pub struct ResourceApi {
    sling_repo: Arc<SlingRepository>,
    cabinet_repo: Arc<CabinetRepository>,
    default_page_size: i64,
}

impl ResourceApi {
    pub fn new(sling_repo: Arc<SlingRepository>, cabinet_repo: Arc<CabinetRepository>) -> Self {
        Self {
            sling_repo,
            cabinet_repo,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_default_page_size(mut self, page_size: i64) -> Self {
        self.default_page_size = page_size;
        self
    }

    // ==========================================
    // 吊索具
    // ==========================================

    pub fn add_sling(&self, mut sling: Sling) -> ApiResult<i64> {
        Self::normalize_sling(&mut sling);
        self.validate_sling(&sling)?;
        let id = self.sling_repo.insert(&sling)?;
        tracing::info!("新增吊索具: id={}, rf_id={}", id, sling.rf_id);
        Ok(id)
    }

    pub fn update_sling(&self, mut sling: Sling) -> ApiResult<()> {
        require_id(sling.id)?;
        Self::normalize_sling(&mut sling);
        self.validate_sling(&sling)?;
        let affected = self.sling_repo.update(&sling)?;
        ensure_affected(affected, "Sling", sling.id)?;
        tracing::info!("更新吊索具: id={}", sling.id);
        Ok(())
    }

    fn normalize_sling(sling: &mut Sling) {
        sling.name = sling.name.trim().to_string();
        sling.rf_id = sling.rf_id.trim().to_string();
    }

    fn validate_sling(&self, sling: &Sling) -> ApiResult<()> {
        require_non_empty(&sling.name, "吊索具名称")?;
        require_non_empty(&sling.rf_id, "RFID")?;
        if self
            .sling_repo
            .name_or_rf_id_taken(&sling.name, &sling.rf_id, sling.id)?
        {
            tracing::warn!("吊索具重复: name={}, rf_id={}", sling.name, sling.rf_id);
            return Err(ApiError::exists("吊索具名称或RFID"));
        }
        Ok(())
    }

    /// 删除吊索具，同时释放其箱格
    pub fn delete_sling(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        let (slings, grids) = self.sling_repo.delete_with_grid(id)?;
        ensure_affected(slings, "Sling", id)?;
        tracing::info!("删除吊索具: id={}, 释放箱格={}", id, grids);
        Ok(())
    }

    pub fn get_sling(&self, id: i64) -> ApiResult<Sling> {
        require_id(id)?;
        self.sling_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Sling", id))
    }

    /// 按 RFID 查询 (柜端读卡)
    pub fn get_sling_by_rf_id(&self, rf_id: &str) -> ApiResult<Sling> {
        let rf_id = rf_id.trim();
        require_non_empty(rf_id, "RFID")?;
        self.sling_repo
            .find_by_rf_id(rf_id)?
            .ok_or_else(|| ApiError::NotFound(format!("Sling(rf_id={})", rf_id)))
    }

    pub fn list_slings(&self, filter: &SlingQuery, page: PageQuery) -> ApiResult<PageResult<Sling>> {
        let page = page.normalized_with(self.default_page_size);
        Ok(self.sling_repo.list_paged(filter, page)?)
    }

    // ==========================================
    // 智能柜
    // ==========================================

    pub fn add_cabinet(&self, mut cabinet: Cabinet) -> ApiResult<i64> {
        cabinet.name = cabinet.name.trim().to_string();
        self.validate_cabinet(&cabinet)?;
        let id = self.cabinet_repo.insert(&cabinet)?;
        tracing::info!("新增智能柜: id={}, grid_count={}", id, cabinet.grid_count);
        Ok(id)
    }

    pub fn update_cabinet(&self, mut cabinet: Cabinet) -> ApiResult<()> {
        require_id(cabinet.id)?;
        cabinet.name = cabinet.name.trim().to_string();
        self.validate_cabinet(&cabinet)?;

        let highest_used = self
            .cabinet_repo
            .list_grid_rows(cabinet.id)?
            .iter()
            .filter(|g| g.in_res_id > 0)
            .map(|g| g.grid_no)
            .max();
        if let Some(grid_no) = highest_used {
            if grid_no > cabinet.grid_count {
                tracing::warn!(
                    "智能柜缩容被拒绝: id={}, grid_count={}, 已占用={}",
                    cabinet.id,
                    cabinet.grid_count,
                    grid_no
                );
                return Err(ApiError::GridOutOfRange {
                    grid_no,
                    grid_count: cabinet.grid_count,
                });
            }
        }

        let affected = self.cabinet_repo.update(&cabinet)?;
        ensure_affected(affected, "Cabinet", cabinet.id)?;
        tracing::info!("更新智能柜: id={}", cabinet.id);
        Ok(())
    }

    fn validate_cabinet(&self, cabinet: &Cabinet) -> ApiResult<()> {
        require_non_empty(&cabinet.name, "智能柜名称")?;
        if cabinet.grid_count <= 0 {
            return Err(ApiError::InvalidInput("智能柜箱格数不能是0".to_string()));
        }
        if cabinet.grid_count > MAX_GRID_COUNT {
            return Err(ApiError::InvalidInput(format!(
                "智能柜箱格数不能超过{}",
                MAX_GRID_COUNT
            )));
        }
        if self.cabinet_repo.name_taken(&cabinet.name, cabinet.id)? {
            tracing::warn!("智能柜名称重复: {}", cabinet.name);
            return Err(ApiError::exists("智能柜名称"));
        }
        Ok(())
    }

    /// 删除智能柜及其全部箱格
    pub fn delete_cabinet(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        let (cabinets, grids) = self.cabinet_repo.delete_with_grids(id)?;
        ensure_affected(cabinets, "Cabinet", id)?;
        tracing::info!("删除智能柜: id={}, 箱格={}", id, grids);
        Ok(())
    }

    pub fn get_cabinet(&self, id: i64) -> ApiResult<Cabinet> {
        require_id(id)?;
        self.cabinet_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("Cabinet", id))
    }

    pub fn list_cabinets(&self, name: Option<&str>, page: PageQuery) -> ApiResult<PageResult<Cabinet>> {
        let page = page.normalized_with(self.default_page_size);
        Ok(self.cabinet_repo.list_paged(name, page)?)
    }

    /// 箱格稠密视图: 恰好 grid_count 项，编号 1..=grid_count
    pub fn list_grids(&self, cabinet_id: i64) -> ApiResult<Vec<GridSlot>> {
        require_id(cabinet_id)?;
        Ok(self.cabinet_repo.list_grids(cabinet_id)?)
    }
}

// ==========================================
// 吊索具智能柜管理系统 - 数据字典 API
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{ensure_affected, require_id, require_non_empty};
use crate::domain::dict::DictData;
use crate::repository::dict_repo::DictRepository;

pub struct DictApi {
    dict_repo: Arc<DictRepository>,
}

impl DictApi {
    pub fn new(dict_repo: Arc<DictRepository>) -> Self {
        Self { dict_repo }
    }

    /// 按场景/类型查询字典项，空串视为不过滤
    pub fn list(&self, scene: Option<&str>, dict_type: Option<&str>) -> ApiResult<Vec<DictData>> {
        let scene = scene.map(str::trim).filter(|s| !s.is_empty());
        let dict_type = dict_type.map(str::trim).filter(|s| !s.is_empty());
        Ok(self.dict_repo.list(scene, dict_type)?)
    }

    pub fn add(&self, dict: DictData) -> ApiResult<i64> {
        Self::validate(&dict)?;
        let id = self.dict_repo.insert(&dict)?;
        tracing::info!("新增字典项: id={}, type={}, key={}", id, dict.dict_type, dict.key);
        Ok(id)
    }

    pub fn update(&self, dict: DictData) -> ApiResult<()> {
        require_id(dict.id)?;
        Self::validate(&dict)?;
        let affected = self.dict_repo.update(&dict)?;
        ensure_affected(affected, "DictData", dict.id)
    }

    pub fn delete(&self, id: i64) -> ApiResult<()> {
        require_id(id)?;
        let affected = self.dict_repo.delete(id)?;
        ensure_affected(affected, "DictData", id)?;
        tracing::info!("删除字典项: id={}", id);
        Ok(())
    }

    pub fn get(&self, id: i64) -> ApiResult<DictData> {
        require_id(id)?;
        self.dict_repo
            .find_by_id(id)?
            .ok_or_else(|| ApiError::not_found("DictData", id))
    }

    fn validate(dict: &DictData) -> ApiResult<()> {
        require_non_empty(&dict.name, "字典名称")?;
        require_non_empty(&dict.dict_type, "字典类型")
    }
}

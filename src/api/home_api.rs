// ==========================================
// 吊索具智能柜管理系统 - 首页统计 API
// ==========================================

use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::domain::dict::{GroupCount, ResourceOverview, SlingUsageRank};
use crate::repository::stats_repo::StatsRepository;

/// 排行默认条数
pub const DEFAULT_TOP_LIMIT: i64 = 10;

pub struct HomeApi {
    stats_repo: Arc<StatsRepository>,
}

impl HomeApi {
    pub fn new(stats_repo: Arc<StatsRepository>) -> Self {
        Self { stats_repo }
    }

    pub fn overview(&self) -> ApiResult<ResourceOverview> {
        Ok(self.stats_repo.overview()?)
    }

    pub fn slings_by_tonnage(&self) -> ApiResult<Vec<GroupCount>> {
        Ok(self.stats_repo.slings_by_tonnage()?)
    }

    pub fn slings_by_use_status(&self) -> ApiResult<Vec<GroupCount>> {
        Ok(self.stats_repo.slings_by_use_status()?)
    }

    /// 使用次数排行 (limit 缺省或非正时取默认条数)
    pub fn top_used(&self, limit: Option<i64>) -> ApiResult<Vec<SlingUsageRank>> {
        let limit = limit.filter(|n| *n > 0).unwrap_or(DEFAULT_TOP_LIMIT);
        Ok(self.stats_repo.top_slings_by_use(limit)?)
    }
}

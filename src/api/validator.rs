// ==========================================
// 吊索具智能柜管理系统 - 写前校验
// ==========================================
// 职责: 必填字段 / 根记录保护 / ID 参数校验
// 说明: 唯一性校验依赖仓储查询，在各 API 内完成
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::types::is_root_row;

/// 必填字段校验 (去除首尾空白后判断)
pub fn require_non_empty(value: &str, field: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::required(field));
    }
    Ok(())
}

/// 根记录不允许修改
pub fn ensure_updatable(id: i64) -> ApiResult<()> {
    if is_root_row(id) {
        tracing::warn!("拒绝修改根记录: id={}", id);
        return Err(ApiError::UpdateNotAllowed);
    }
    Ok(())
}

/// 根记录不允许删除
pub fn ensure_deletable(id: i64) -> ApiResult<()> {
    if is_root_row(id) {
        tracing::warn!("拒绝删除根记录: id={}", id);
        return Err(ApiError::DeleteNotAllowed);
    }
    Ok(())
}

/// 路径/查询参数中的 ID 必须为正数
pub fn require_id(id: i64) -> ApiResult<()> {
    if id <= 0 {
        return Err(ApiError::BadQueryParams);
    }
    Ok(())
}

/// 仓储更新/删除影响 0 行时视为记录不存在
pub fn ensure_affected(affected: usize, entity: &str, id: i64) -> ApiResult<()> {
    if affected == 0 {
        return Err(ApiError::not_found(entity, id));
    }
    Ok(())
}

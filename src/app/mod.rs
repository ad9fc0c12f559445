// ==========================================
// 吊索具智能柜管理系统 - 应用层
// ==========================================
// 职责: 组装配置、数据库连接、仓储与 API 实例
// ==========================================

pub mod state;

// 重导出
pub use crate::config::get_default_db_path;
pub use state::AppState;

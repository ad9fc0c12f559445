// ==========================================
// 吊索具智能柜管理系统 - 配置层
// ==========================================
// 职责: 应用配置加载 (环境变量 + 默认值)
// ==========================================

pub mod app_config;

// 重导出
pub use app_config::{env_keys, get_default_db_path, AppConfig};

// ==========================================
// 吊索具智能柜管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 业务范围: 组织机构、用户权限、吊索具、智能柜箱格、借还记录
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 配置层 - 应用配置
pub mod config;

// 数据库基础设施（连接初始化/建表/根记录）
pub mod db;

// 日志系统
pub mod logging;

// 文件存储 - 员工照片
pub mod storage;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ReturnFilter, TakeReturnFlag, UseStatus, UserStatus};

// 领域实体
pub use domain::{
    Cabinet, CabinetGrid, Company, Department, DictData, GridSlot, PageQuery, PageResult, Role,
    SessionClaims, Sling, Staff, TakeReturnRequest, UseLog, User,
};

// API
pub use api::{
    ApiError, ApiResponse, ApiResult, AuthApi, DictApi, HomeApi, OrgApi, ResourceApi, RoleApi,
    UsageApi,
};

// 应用
pub use app::AppState;
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "吊索具智能柜管理系统";
